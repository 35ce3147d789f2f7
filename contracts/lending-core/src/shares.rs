//! Share ledger operations on top of `stellar_tokens::fungible::Base`.
//!
//! Balances and allowances live in the fungible base storage, so the SEP-41
//! surface and the market accounting always read the same numbers.

use soroban_sdk::{Address, Env};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::{emit_transfer, Base as TokenBase};

use crate::errors::LendingError;
use crate::manager::Manager;
use crate::math::{to_i128, to_u128};

pub fn balance(env: &Env, account: &Address) -> u128 {
    to_u128(TokenBase::balance(env, account))
}

pub fn total_supply(env: &Env) -> u128 {
    to_u128(TokenBase::total_supply(env))
}

pub fn allowance(env: &Env, owner: &Address, spender: &Address) -> u128 {
    to_u128(TokenBase::allowance(env, owner, spender))
}

pub fn mint(env: &Env, to: &Address, shares: u128) -> Result<(), LendingError> {
    TokenBase::mint(env, to, to_i128(shares)?);
    Ok(())
}

pub fn burn(env: &Env, from: &Address, shares: u128) -> Result<(), LendingError> {
    if balance(env, from) < shares {
        return Err(LendingError::InsufficientShares);
    }
    let amount = to_i128(shares)?;
    TokenBase::update(env, Some(from), None, amount);
    emit_burn(env, from, amount);
    Ok(())
}

/// Privileged move used by liquidations: no allowance, same transfer event.
pub fn seize_shares(env: &Env, from: &Address, to: &Address, shares: u128) -> Result<(), LendingError> {
    if shares == 0 {
        return Ok(());
    }
    if balance(env, from) < shares {
        return Err(LendingError::ExcessiveValue);
    }
    let amount = to_i128(shares)?;
    TokenBase::update(env, Some(from), Some(to), amount);
    emit_transfer(env, from, to, amount);
    Ok(())
}

/// Consumes allowance when a third party acts on `owner`'s shares.
pub fn spend_allowance(
    env: &Env,
    owner: &Address,
    spender: &Address,
    shares: u128,
) -> Result<(), LendingError> {
    if owner == spender {
        return Ok(());
    }
    if allowance(env, owner, spender) < shares {
        return Err(LendingError::InsufficientAllowance);
    }
    TokenBase::spend_allowance(env, owner, spender, to_i128(shares)?);
    Ok(())
}

/// User transfer, gated by the manager and mirrored into the gauge pool.
///
/// `spender` is `None` for a direct transfer by `from`.
pub fn transfer(
    env: &Env,
    manager: &Manager,
    spender: Option<&Address>,
    from: &Address,
    to: &Address,
    shares: u128,
    release_collateral: bool,
) -> Result<(), LendingError> {
    if shares == 0 {
        return Err(LendingError::AmountZero);
    }
    if from == to {
        return Err(LendingError::SelfTransferNotAllowed);
    }
    let held = balance(env, from);
    if held < shares {
        return Err(LendingError::InsufficientShares);
    }
    manager.can_transfer(env, from, shares)?;
    if release_collateral {
        manager.reduce_collateral_if_necessary(env, from, held, shares)?;
    }
    let amount = to_i128(shares)?;
    match spender {
        Some(spender) => {
            if allowance(env, from, spender) < shares {
                return Err(LendingError::InsufficientAllowance);
            }
            TokenBase::transfer_from(env, spender, from, to, amount);
        }
        None => TokenBase::transfer(env, from, to, amount),
    }
    manager.gauge_withdraw(env, from, shares)?;
    manager.gauge_deposit(env, to, shares)?;
    Ok(())
}
