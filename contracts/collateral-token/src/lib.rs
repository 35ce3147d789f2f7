#![no_std]

//! Primitive cToken: an ERC4626 style share vault over an idle asset, usable
//! as collateral by the debt markets of the same manager.

mod contract;

pub use contract::{CollateralToken, CollateralTokenClient};

#[cfg(test)]
mod test;
