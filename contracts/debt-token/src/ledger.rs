//! Debt side accounting: lazy interest accrual, borrow snapshots and the
//! lender exchange rate.

use lending_core::calls::forward;
use lending_core::constants::{MAX_BORROW_RATE_PER_SECOND, WAD};
use lending_core::interfaces::InterestRateModelClient;
use lending_core::manager::Manager;
use lending_core::math::{checked_add, mul_div_down, mul_div_up, to_i128, to_u128, wad_mul};
use lending_core::shares;
use lending_core::LendingError;
use soroban_sdk::{log, token, Address, Env};

use crate::events::{AccrueInterest, Borrow, RepayBorrow};
use crate::storage::{self, DebtMarketState, DebtPosition};

/// Underlying held by the market.
pub fn cash(env: &Env) -> Result<u128, LendingError> {
    let underlying = storage::underlying(env)?;
    Ok(to_u128(
        token::Client::new(env, &underlying).balance(&env.current_contract_address()),
    ))
}

pub fn manager(env: &Env) -> Result<Manager, LendingError> {
    Ok(Manager::new(storage::market_manager(env)?))
}

/// Interest for `elapsed` seconds at `rate`, applied to all four totals.
///
/// Returns the new state and the interest added to total borrows.
pub fn apply_interest(
    state: &DebtMarketState,
    rate: u128,
    now: u64,
    reserve_factor: u128,
) -> Result<(DebtMarketState, u128), LendingError> {
    if rate > MAX_BORROW_RATE_PER_SECOND {
        return Err(LendingError::BorrowRateTooHigh);
    }
    let elapsed = now.saturating_sub(state.accrual_timestamp) as u128;
    let interest_factor = rate
        .checked_mul(elapsed)
        .ok_or(LendingError::MathOverflow)?;
    let interest = mul_div_down(interest_factor, state.total_borrows, WAD)?;
    let index_delta = mul_div_down(interest_factor, state.borrow_index, WAD)?;
    // reserve_factor * factor * borrows / WAD^2, taken from the rounded interest
    let reserves_delta = wad_mul(interest, reserve_factor)?;

    let next = DebtMarketState {
        total_borrows: checked_add(state.total_borrows, interest)?,
        total_reserves: checked_add(state.total_reserves, reserves_delta)?,
        borrow_index: checked_add(state.borrow_index, index_delta)?,
        accrual_timestamp: now.max(state.accrual_timestamp),
    };
    Ok((next, interest))
}

/// Brings the market up to the current timestamp. No-op when already fresh.
pub fn accrue_interest(env: &Env) -> Result<DebtMarketState, LendingError> {
    let state = storage::market_state(env)?;
    let now = env.ledger().timestamp();
    if state.accrual_timestamp >= now {
        return Ok(state);
    }

    let cash_prior = cash(env)?;
    let model = storage::interest_rate_model(env)?;
    let rate = forward(
        env,
        &model,
        "get_borrow_rate_with_update",
        InterestRateModelClient::new(env, &model).try_get_borrow_rate_with_update(
            &cash_prior,
            &state.total_borrows,
            &state.total_reserves,
        ),
    )?;
    let (next, interest) = apply_interest(&state, rate, now, storage::reserve_factor(env))?;
    storage::set_market_state(env, &next);

    log!(env, "accrue", rate, interest, next.borrow_index);
    AccrueInterest {
        cash_prior,
        interest_accumulated: interest,
        borrow_index: next.borrow_index,
        total_borrows: next.total_borrows,
        total_reserves: next.total_reserves,
    }
    .publish(env);
    Ok(next)
}

/// State as it would be after accruing now, without writing anything.
pub fn projected_state(env: &Env) -> Result<DebtMarketState, LendingError> {
    let state = storage::market_state(env)?;
    let now = env.ledger().timestamp();
    if state.accrual_timestamp >= now {
        return Ok(state);
    }
    let model = storage::interest_rate_model(env)?;
    let rate = forward(
        env,
        &model,
        "get_borrow_rate",
        InterestRateModelClient::new(env, &model).try_get_borrow_rate(
            &cash(env)?,
            &state.total_borrows,
            &state.total_reserves,
        ),
    )?;
    Ok(apply_interest(&state, rate, now, storage::reserve_factor(env))?.0)
}

/// Current debt of a snapshot under `borrow_index`.
pub fn debt_of(position: &DebtPosition, borrow_index: u128) -> Result<u128, LendingError> {
    if position.principal == 0 {
        return Ok(0);
    }
    mul_div_down(position.principal, borrow_index, position.interest_index)
}

/// Underlying owed to lenders: `cash + borrows - reserves`.
pub fn lender_assets(cash: u128, state: &DebtMarketState) -> Result<u128, LendingError> {
    checked_add(cash, state.total_borrows)?
        .checked_sub(state.total_reserves)
        .ok_or(LendingError::InsufficientReserves)
}

/// WAD scaled underlying per dToken share.
pub fn exchange_rate(env: &Env, cash: u128, state: &DebtMarketState) -> Result<u128, LendingError> {
    let supply = shares::total_supply(env);
    if supply == 0 {
        return Ok(WAD);
    }
    mul_div_down(lender_assets(cash, state)?, WAD, supply)
}

/// Shares worth `assets` when lenders own `pool` underlying.
pub fn shares_for_assets(
    env: &Env,
    assets: u128,
    pool: u128,
    round_up: bool,
) -> Result<u128, LendingError> {
    let supply = shares::total_supply(env);
    if supply == 0 || pool == 0 {
        return Ok(assets);
    }
    if round_up {
        mul_div_up(assets, supply, pool)
    } else {
        mul_div_down(assets, supply, pool)
    }
}

pub fn assets_for_shares(env: &Env, shares_amount: u128, pool: u128) -> Result<u128, LendingError> {
    let supply = shares::total_supply(env);
    if supply == 0 {
        return Ok(shares_amount);
    }
    mul_div_down(shares_amount, pool, supply)
}

/// Records a borrow of `amount` for `account` and pays it to `recipient`.
/// Interest must already be accrued to `state`.
pub fn borrow(
    env: &Env,
    mut state: DebtMarketState,
    account: &Address,
    recipient: &Address,
    amount: u128,
) -> Result<(), LendingError> {
    if amount == 0 {
        return Err(LendingError::AmountZero);
    }
    if state.accrual_timestamp != env.ledger().timestamp() {
        return Err(LendingError::StaleAccrual);
    }
    if cash(env)? < amount {
        return Err(LendingError::CashNotAvailable);
    }
    let position = storage::debt_position(env, account);
    let account_borrows = checked_add(debt_of(&position, state.borrow_index)?, amount)?;
    storage::set_debt_position(
        env,
        account,
        &DebtPosition {
            principal: account_borrows,
            interest_index: state.borrow_index,
        },
    );
    state.total_borrows = checked_add(state.total_borrows, amount)?;
    storage::set_market_state(env, &state);

    let underlying = storage::underlying(env)?;
    token::Client::new(env, &underlying).transfer(
        &env.current_contract_address(),
        recipient,
        &to_i128(amount)?,
    );

    Borrow {
        borrower: account.clone(),
        borrow_amount: amount,
        account_borrows,
        total_borrows: state.total_borrows,
    }
    .publish(env);
    Ok(())
}

/// Repays `amount` of `account`'s debt from `payer`; `0` repays everything.
/// Returns the amount actually repaid.
pub fn repay(
    env: &Env,
    mut state: DebtMarketState,
    payer: &Address,
    account: &Address,
    amount: u128,
) -> Result<u128, LendingError> {
    let position = storage::debt_position(env, account);
    let debt = debt_of(&position, state.borrow_index)?;
    let repay_amount = if amount == 0 { debt } else { amount };
    if repay_amount == 0 {
        return Err(LendingError::AmountZero);
    }
    if repay_amount > debt {
        return Err(LendingError::ExcessiveValue);
    }

    let underlying = storage::underlying(env)?;
    token::Client::new(env, &underlying).transfer(
        payer,
        &env.current_contract_address(),
        &to_i128(repay_amount)?,
    );

    let account_borrows = debt - repay_amount;
    storage::set_debt_position(
        env,
        account,
        &DebtPosition {
            principal: account_borrows,
            interest_index: state.borrow_index,
        },
    );
    // per account rounding can leave the sum of debts above total borrows
    state.total_borrows = state.total_borrows.saturating_sub(repay_amount);
    storage::set_market_state(env, &state);

    RepayBorrow {
        payer: payer.clone(),
        borrower: account.clone(),
        repay_amount,
        account_borrows,
        total_borrows: state.total_borrows,
    }
    .publish(env);
    Ok(repay_amount)
}
