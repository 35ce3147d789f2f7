#![no_std]

//! Shared accounting for the lending markets: fixed point math, the borrow
//! curve, reward vesting, the generic share vault and the client surfaces of
//! the collaborators the markets call into.

pub mod calls;
pub mod constants;
mod errors;
pub mod events;
pub mod guard;
pub mod interfaces;
pub mod manager;
pub mod math;
pub mod rate_curve;
pub mod shares;
pub mod storage;
pub mod vault;
pub mod vesting;

pub use errors::LendingError;
