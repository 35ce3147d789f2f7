//! Repay-and-seize across markets.

use lending_core::calls::forward;
use lending_core::events::SharesSeized;
use lending_core::interfaces::CollateralMarketClient;
use lending_core::manager::Manager;
use lending_core::math::to_u128;
use lending_core::shares;
use lending_core::LendingError;
use soroban_sdk::{contracttype, Address, Env};

use crate::events::LiquidateBorrow;
use crate::ledger;
use crate::storage;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidationOutcome {
    pub repaid: u128,
    pub liquidated_shares: u128,
    pub protocol_shares: u128,
}

/// Repays part of `borrower`'s debt with the liquidator's cash and takes
/// collateral shares from `collateral_market` in return.
///
/// Both markets must be accrued as of now. When the collateral is this
/// market's own dToken the shares move locally.
pub fn liquidate(
    env: &Env,
    liquidator: &Address,
    borrower: &Address,
    repay_amount: u128,
    collateral_market: &Address,
) -> Result<LiquidationOutcome, LendingError> {
    if liquidator == borrower {
        return Err(LendingError::SelfLiquidationNotAllowed);
    }
    if repay_amount == 0 {
        return Err(LendingError::AmountZero);
    }
    let state = ledger::accrue_interest(env)?;
    let manager = ledger::manager(env)?;
    let this = env.current_contract_address();
    let local = *collateral_market == this;

    let collateral = CollateralMarketClient::new(env, collateral_market);
    if !local {
        if !manager.is_listed(env, collateral_market)? {
            return Err(LendingError::Unauthorized);
        }
        if collateral.accrual_timestamp() != env.ledger().timestamp() {
            return Err(LendingError::StaleAccrual);
        }
    }
    manager.can_liquidate(env, collateral_market, borrower, repay_amount)?;

    let repaid = ledger::repay(env, state, liquidator, borrower, repay_amount)?;
    let (liquidated_shares, protocol_shares) =
        manager.calculate_liquidation(env, collateral_market, repaid)?;
    if liquidated_shares == 0 {
        return Err(LendingError::ZeroShares);
    }

    let held = if local {
        shares::balance(env, borrower)
    } else {
        to_u128(collateral.balance(borrower))
    };
    if held < liquidated_shares {
        return Err(LendingError::ExcessiveValue);
    }

    if local {
        seize_local(
            env,
            &manager,
            liquidator,
            borrower,
            liquidated_shares,
            protocol_shares,
        )?;
    } else {
        forward(
            env,
            collateral_market,
            "seize",
            collateral.try_seize(
                &this,
                liquidator,
                borrower,
                &liquidated_shares,
                &protocol_shares,
            ),
        )?;
    }

    LiquidateBorrow {
        liquidator: liquidator.clone(),
        borrower: borrower.clone(),
        repay_amount: repaid,
        collateral_market: collateral_market.clone(),
        seized_shares: liquidated_shares,
        protocol_shares,
    }
    .publish(env);
    Ok(LiquidationOutcome {
        repaid,
        liquidated_shares,
        protocol_shares,
    })
}

/// Moves this market's own shares from `account`, splitting off the
/// protocol cut to the fee recipient.
pub fn seize_local(
    env: &Env,
    manager: &Manager,
    liquidator: &Address,
    account: &Address,
    liquidated_shares: u128,
    protocol_shares: u128,
) -> Result<(), LendingError> {
    if liquidator == account {
        return Err(LendingError::SelfLiquidationNotAllowed);
    }
    if protocol_shares > liquidated_shares {
        return Err(LendingError::ExcessiveValue);
    }
    let fee_recipient = storage::fee_recipient(env)?;
    let to_liquidator = liquidated_shares - protocol_shares;
    shares::seize_shares(env, account, liquidator, to_liquidator)?;
    shares::seize_shares(env, account, &fee_recipient, protocol_shares)?;

    manager.gauge_withdraw(env, account, liquidated_shares)?;
    if to_liquidator > 0 {
        manager.gauge_deposit(env, liquidator, to_liquidator)?;
    }
    if protocol_shares > 0 {
        manager.gauge_deposit(env, &fee_recipient, protocol_shares)?;
    }

    SharesSeized {
        liquidator: liquidator.clone(),
        account: account.clone(),
        liquidated_shares,
        protocol_shares,
    }
    .publish(env);
    Ok(())
}
