#![no_std]

//! Debt market (dToken). Lenders mint shares against cash, borrowers draw the
//! cash and owe it back under a lazily accrued borrow index.

mod contract;
mod events;
mod ledger;
mod liquidation;
mod storage;

pub use contract::{DebtToken, DebtTokenClient};
pub use liquidation::LiquidationOutcome;
pub use storage::{DebtMarketState, DebtPosition};

#[cfg(test)]
mod test;
