use lending_core::constants::{MAX_RESERVE_FACTOR, SEED_AMOUNT, SHARE_DECIMALS, WAD};
use lending_core::events::{MarketStarted, NewAdmin};
use lending_core::guard::ReentrancyGuard;
use lending_core::interfaces::{InterestRateModelClient, PositionFoldingClient};
use lending_core::manager::Manager;
use lending_core::calls::forward;
use lending_core::math::to_i128;
use lending_core::shares;
use lending_core::LendingError;
use soroban_sdk::{contract, contractimpl, token, Address, Bytes, Env, String};
use stellar_tokens::fungible::Base as TokenBase;

use crate::events::{Mint, NewInterestRateModel, NewReserveFactor, Redeem, ReservesWithdrawn};
use crate::ledger;
use crate::liquidation::{self, LiquidationOutcome};
use crate::storage::{self, DebtMarketState, DebtPosition};

#[contract]
pub struct DebtToken;

#[contractimpl]
impl DebtToken {
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        underlying: Address,
        market_manager: Address,
        interest_rate_model: Address,
        reserve_factor: u128,
        fee_recipient: Address,
        name: String,
        symbol: String,
    ) -> Result<(), LendingError> {
        if storage::is_initialized(&env) {
            return Err(LendingError::AlreadyInitialized);
        }
        admin.require_auth();
        if reserve_factor > MAX_RESERVE_FACTOR {
            return Err(LendingError::InvalidReserveFactor);
        }
        ensure_rate_model(&env, &interest_rate_model)?;

        storage::set_admin(&env, &admin);
        storage::set_underlying(&env, &underlying);
        storage::set_market_manager(&env, &market_manager);
        storage::set_interest_rate_model(&env, &interest_rate_model);
        storage::set_reserve_factor(&env, reserve_factor);
        storage::set_fee_recipient(&env, &fee_recipient);
        storage::set_market_state(
            &env,
            &DebtMarketState {
                total_borrows: 0,
                total_reserves: 0,
                borrow_index: WAD,
                accrual_timestamp: env.ledger().timestamp(),
            },
        );
        TokenBase::set_metadata(&env, SHARE_DECIMALS, name, symbol);
        Ok(())
    }

    /// Seeds the market so the share supply never starts from zero in an
    /// attacker controlled call. The seed shares belong to the market.
    pub fn start_market(env: Env, initializer: Address) -> Result<(), LendingError> {
        initializer.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        if storage::started(&env) {
            return Err(LendingError::MarketAlreadyStarted);
        }
        ledger::accrue_interest(&env)?;
        let underlying = storage::underlying(&env)?;
        let market = env.current_contract_address();
        token::Client::new(&env, &underlying).transfer(
            &initializer,
            &market,
            &to_i128(SEED_AMOUNT)?,
        );
        shares::mint(&env, &market, SEED_AMOUNT)?;
        storage::set_started(&env);
        MarketStarted {
            initializer,
            assets: SEED_AMOUNT,
        }
        .publish(&env);
        Ok(())
    }

    pub fn accrue_interest(env: Env) -> Result<DebtMarketState, LendingError> {
        let _guard = ReentrancyGuard::acquire(&env)?;
        ledger::accrue_interest(&env)
    }

    // lenders

    pub fn mint(env: Env, account: Address, amount: u128) -> Result<u128, LendingError> {
        Self::mint_for(env, account.clone(), account, amount)
    }

    /// Supplies `amount` of `payer`'s cash and credits the shares to `recipient`.
    pub fn mint_for(
        env: Env,
        payer: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<u128, LendingError> {
        payer.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        ensure_started(&env)?;
        if amount == 0 {
            return Err(LendingError::AmountZero);
        }
        let state = ledger::accrue_interest(&env)?;
        let manager = ledger::manager(&env)?;
        manager.can_mint(&env, &recipient)?;

        let pool = ledger::lender_assets(ledger::cash(&env)?, &state)?;
        let minted = ledger::shares_for_assets(&env, amount, pool, false)?;
        if minted == 0 {
            return Err(LendingError::ZeroShares);
        }
        let underlying = storage::underlying(&env)?;
        token::Client::new(&env, &underlying).transfer(
            &payer,
            &env.current_contract_address(),
            &to_i128(amount)?,
        );
        shares::mint(&env, &recipient, minted)?;
        manager.gauge_deposit(&env, &recipient, minted)?;

        Mint {
            minter: recipient,
            mint_amount: amount,
            mint_tokens: minted,
        }
        .publish(&env);
        Ok(minted)
    }

    /// Burns `amount` shares and returns the underlying paid out.
    pub fn redeem(env: Env, account: Address, amount: u128) -> Result<u128, LendingError> {
        account.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        ensure_started(&env)?;
        if amount == 0 {
            return Err(LendingError::AmountZero);
        }
        let state = ledger::accrue_interest(&env)?;
        let pool = ledger::lender_assets(ledger::cash(&env)?, &state)?;
        let assets = ledger::assets_for_shares(&env, amount, pool)?;
        if assets == 0 {
            return Err(LendingError::ZeroAssets);
        }
        redeem_internal(&env, &account, amount, assets)?;
        Ok(assets)
    }

    /// Pays out exactly `amount` underlying and returns the shares burned.
    pub fn redeem_underlying(env: Env, account: Address, amount: u128) -> Result<u128, LendingError> {
        account.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        ensure_started(&env)?;
        if amount == 0 {
            return Err(LendingError::AmountZero);
        }
        let state = ledger::accrue_interest(&env)?;
        let pool = ledger::lender_assets(ledger::cash(&env)?, &state)?;
        let burned = ledger::shares_for_assets(&env, amount, pool, true)?;
        redeem_internal(&env, &account, burned, amount)?;
        Ok(burned)
    }

    // borrowers

    pub fn borrow(env: Env, account: Address, amount: u128) -> Result<(), LendingError> {
        account.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        ensure_started(&env)?;
        let state = ledger::accrue_interest(&env)?;
        ledger::manager(&env)?.can_borrow(&env, &account, amount)?;
        ledger::borrow(&env, state, &account, &account, amount)
    }

    /// Borrow routed through the manager's position folding contract. The
    /// solvency check runs after the folding callback has re-deposited.
    pub fn borrow_for_position_folding(
        env: Env,
        position_folding: Address,
        account: Address,
        amount: u128,
        params: Bytes,
    ) -> Result<(), LendingError> {
        position_folding.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        ensure_started(&env)?;
        let manager = ledger::manager(&env)?;
        manager.require_position_folding(&env, &position_folding)?;
        let state = ledger::accrue_interest(&env)?;
        ledger::borrow(&env, state, &account, &position_folding, amount)?;

        let market = env.current_contract_address();
        PositionFoldingClient::new(&env, &position_folding).on_borrow(
            &market,
            &account,
            &amount,
            &params,
        );
        manager.can_borrow(&env, &account, 0)
    }

    /// Repays the caller's debt; `amount == 0` repays all of it.
    pub fn repay(env: Env, account: Address, amount: u128) -> Result<u128, LendingError> {
        Self::repay_for(env, account.clone(), account, amount)
    }

    pub fn repay_for(
        env: Env,
        payer: Address,
        account: Address,
        amount: u128,
    ) -> Result<u128, LendingError> {
        payer.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        let state = ledger::accrue_interest(&env)?;
        ledger::manager(&env)?.can_repay(&env, &account)?;
        ledger::repay(&env, state, &payer, &account, amount)
    }

    pub fn liquidate(
        env: Env,
        liquidator: Address,
        borrower: Address,
        repay_amount: u128,
        collateral_market: Address,
    ) -> Result<LiquidationOutcome, LendingError> {
        liquidator.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        liquidation::liquidate(&env, &liquidator, &borrower, repay_amount, &collateral_market)
    }

    /// Seize entry point for another debt market that holds this market's
    /// shares as collateral.
    pub fn seize(
        env: Env,
        debt_market: Address,
        liquidator: Address,
        account: Address,
        liquidated_shares: u128,
        protocol_shares: u128,
    ) -> Result<(), LendingError> {
        debt_market.require_auth();
        let _guard = ReentrancyGuard::acquire(&env)?;
        let manager = ledger::manager(&env)?;
        if liquidator == account {
            return Err(LendingError::SelfLiquidationNotAllowed);
        }
        if !manager.is_listed(&env, &debt_market)? {
            return Err(LendingError::Unauthorized);
        }
        manager.can_seize(&env, &debt_market)?;
        if shares::balance(&env, &account) < liquidated_shares {
            return Err(LendingError::ExcessiveValue);
        }
        liquidation::seize_local(
            &env,
            &manager,
            &liquidator,
            &account,
            liquidated_shares,
            protocol_shares,
        )
    }

    // administration

    pub fn set_interest_rate_model(env: Env, model: Address) -> Result<(), LendingError> {
        storage::require_admin(&env)?;
        let _guard = ReentrancyGuard::acquire(&env)?;
        ensure_rate_model(&env, &model)?;
        // interest up to now accrues under the old model
        ledger::accrue_interest(&env)?;
        let old_model = storage::interest_rate_model(&env)?;
        storage::set_interest_rate_model(&env, &model);
        NewInterestRateModel {
            old_model,
            new_model: model,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_reserve_factor(env: Env, reserve_factor: u128) -> Result<(), LendingError> {
        storage::require_admin(&env)?;
        let _guard = ReentrancyGuard::acquire(&env)?;
        if reserve_factor > MAX_RESERVE_FACTOR {
            return Err(LendingError::InvalidReserveFactor);
        }
        ledger::accrue_interest(&env)?;
        let old_reserve_factor = storage::reserve_factor(&env);
        storage::set_reserve_factor(&env, reserve_factor);
        NewReserveFactor {
            old_reserve_factor,
            new_reserve_factor: reserve_factor,
        }
        .publish(&env);
        Ok(())
    }

    pub fn withdraw_reserves(env: Env, to: Address, amount: u128) -> Result<(), LendingError> {
        storage::require_admin(&env)?;
        let _guard = ReentrancyGuard::acquire(&env)?;
        let mut state = ledger::accrue_interest(&env)?;
        if amount > state.total_reserves {
            return Err(LendingError::InsufficientReserves);
        }
        if amount > ledger::cash(&env)? {
            return Err(LendingError::CashNotAvailable);
        }
        state.total_reserves -= amount;
        storage::set_market_state(&env, &state);
        let underlying = storage::underlying(&env)?;
        token::Client::new(&env, &underlying).transfer(
            &env.current_contract_address(),
            &to,
            &to_i128(amount)?,
        );
        ReservesWithdrawn {
            to,
            amount,
            total_reserves: state.total_reserves,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), LendingError> {
        storage::require_admin(&env)?;
        storage::set_admin(&env, &new_admin);
        NewAdmin { admin: new_admin }.publish(&env);
        Ok(())
    }

    pub fn set_fee_recipient(env: Env, recipient: Address) -> Result<(), LendingError> {
        storage::require_admin(&env)?;
        storage::set_fee_recipient(&env, &recipient);
        Ok(())
    }

    // views

    pub fn debt_balance(env: Env, account: Address) -> Result<u128, LendingError> {
        let state = ledger::projected_state(&env)?;
        ledger::debt_of(&storage::debt_position(&env, &account), state.borrow_index)
    }

    pub fn debt_balance_cached(env: Env, account: Address) -> Result<u128, LendingError> {
        let state = storage::market_state(&env)?;
        ledger::debt_of(&storage::debt_position(&env, &account), state.borrow_index)
    }

    pub fn debt_position(env: Env, account: Address) -> DebtPosition {
        storage::debt_position(&env, &account)
    }

    pub fn exchange_rate(env: Env) -> Result<u128, LendingError> {
        let state = ledger::projected_state(&env)?;
        ledger::exchange_rate(&env, ledger::cash(&env)?, &state)
    }

    pub fn exchange_rate_cached(env: Env) -> Result<u128, LendingError> {
        let state = storage::market_state(&env)?;
        ledger::exchange_rate(&env, ledger::cash(&env)?, &state)
    }

    pub fn borrow_rate(env: Env) -> Result<u128, LendingError> {
        let state = storage::market_state(&env)?;
        let model = storage::interest_rate_model(&env)?;
        forward(
            &env,
            &model,
            "get_borrow_rate",
            InterestRateModelClient::new(&env, &model).try_get_borrow_rate(
                &ledger::cash(&env)?,
                &state.total_borrows,
                &state.total_reserves,
            ),
        )
    }

    pub fn supply_rate(env: Env) -> Result<u128, LendingError> {
        let state = storage::market_state(&env)?;
        let model = storage::interest_rate_model(&env)?;
        forward(
            &env,
            &model,
            "get_supply_rate",
            InterestRateModelClient::new(&env, &model).try_get_supply_rate(
                &ledger::cash(&env)?,
                &state.total_borrows,
                &state.total_reserves,
                &storage::reserve_factor(&env),
            ),
        )
    }

    pub fn market_state(env: Env) -> Result<DebtMarketState, LendingError> {
        storage::market_state(&env)
    }

    pub fn cash(env: Env) -> Result<u128, LendingError> {
        ledger::cash(&env)
    }

    pub fn total_borrows(env: Env) -> Result<u128, LendingError> {
        Ok(storage::market_state(&env)?.total_borrows)
    }

    pub fn total_reserves(env: Env) -> Result<u128, LendingError> {
        Ok(storage::market_state(&env)?.total_reserves)
    }

    pub fn borrow_index(env: Env) -> Result<u128, LendingError> {
        Ok(storage::market_state(&env)?.borrow_index)
    }

    pub fn accrual_timestamp(env: Env) -> Result<u64, LendingError> {
        Ok(storage::market_state(&env)?.accrual_timestamp)
    }

    pub fn reserve_factor(env: Env) -> u128 {
        storage::reserve_factor(&env)
    }

    pub fn interest_rate_model(env: Env) -> Result<Address, LendingError> {
        storage::interest_rate_model(&env)
    }

    pub fn underlying(env: Env) -> Result<Address, LendingError> {
        storage::underlying(&env)
    }

    pub fn admin(env: Env) -> Result<Address, LendingError> {
        storage::admin(&env)
    }

    pub fn is_started(env: Env) -> bool {
        storage::started(&env)
    }

    // share token

    pub fn balance(env: Env, id: Address) -> i128 {
        TokenBase::balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        TokenBase::allowance(&env, &owner, &spender)
    }

    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: u128,
        live_until_ledger: u32,
    ) -> Result<(), LendingError> {
        TokenBase::approve(&env, &owner, &spender, to_i128(amount)?, live_until_ledger);
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: u128) -> Result<(), LendingError> {
        let _guard = ReentrancyGuard::acquire(&env)?;
        let manager = ledger::manager(&env)?;
        shares::transfer(&env, &manager, None, &from, &to, amount, false)
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LendingError> {
        let _guard = ReentrancyGuard::acquire(&env)?;
        let manager = ledger::manager(&env)?;
        shares::transfer(&env, &manager, Some(&spender), &from, &to, amount, false)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }
}

fn ensure_started(env: &Env) -> Result<(), LendingError> {
    if !storage::started(env) {
        return Err(LendingError::MarketNotStarted);
    }
    Ok(())
}

fn ensure_rate_model(env: &Env, model: &Address) -> Result<(), LendingError> {
    match InterestRateModelClient::new(env, model).try_is_interest_rate_model() {
        Ok(Ok(true)) => Ok(()),
        _ => Err(LendingError::InvalidRateModel),
    }
}

fn redeem_internal(
    env: &Env,
    account: &Address,
    burned: u128,
    assets: u128,
) -> Result<(), LendingError> {
    if burned == 0 && assets > 0 {
        return Err(LendingError::ZeroShares);
    }
    if shares::balance(env, account) < burned {
        return Err(LendingError::InsufficientShares);
    }
    let manager: Manager = ledger::manager(env)?;
    manager.can_redeem(env, account, burned)?;
    if assets > ledger::cash(env)? {
        return Err(LendingError::CashNotAvailable);
    }
    shares::burn(env, account, burned)?;
    let underlying = storage::underlying(env)?;
    token::Client::new(env, &underlying).transfer(
        &env.current_contract_address(),
        account,
        &to_i128(assets)?,
    );
    manager.gauge_withdraw(env, account, burned)?;

    Redeem {
        redeemer: account.clone(),
        redeem_amount: assets,
        redeem_tokens: burned,
    }
    .publish(env);
    Ok(())
}
