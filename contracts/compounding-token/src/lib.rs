#![no_std]

//! Compounding cToken. Assets are parked in a strategy adapter and harvested
//! yield is released to share holders over a vesting window.

mod contract;

pub use contract::{CompoundingToken, CompoundingTokenClient};
