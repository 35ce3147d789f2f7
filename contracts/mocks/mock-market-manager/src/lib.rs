#![no_std]
//! Configurable market manager for tests. Every admission passes unless the
//! function name was denied with `set_deny`. It doubles as the gauge pool.

use lending_core::LendingError;
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Symbol};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Deny(Symbol),
    Liquidation,
    PositionFolding,
    Harvester(Address),
    Unlisted(Address),
    MintPaused(Address),
    GaugeEnabled,
    GaugeBalance(Address, Address),
    Posted(Address, Address),
}

#[contract]
pub struct MockMarketManager;

fn check(env: &Env, function: &str) -> Result<(), LendingError> {
    let denied: bool = env
        .storage()
        .instance()
        .get(&DataKey::Deny(Symbol::new(env, function)))
        .unwrap_or(false);
    if denied {
        return Err(LendingError::AdmissionDenied);
    }
    Ok(())
}

fn posted(env: &Env, account: &Address, market: &Address) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::Posted(account.clone(), market.clone()))
        .unwrap_or(0)
}

fn set_posted(env: &Env, account: &Address, market: &Address, shares: u128) {
    env.storage()
        .instance()
        .set(&DataKey::Posted(account.clone(), market.clone()), &shares);
}

#[contractimpl]
impl MockMarketManager {
    pub fn set_deny(env: Env, function: Symbol, deny: bool) {
        env.storage().instance().set(&DataKey::Deny(function), &deny);
    }

    pub fn set_liquidation(env: Env, liquidated_shares: u128, protocol_shares: u128) {
        env.storage()
            .instance()
            .set(&DataKey::Liquidation, &(liquidated_shares, protocol_shares));
    }

    pub fn set_position_folding(env: Env, folding: Address) {
        env.storage().instance().set(&DataKey::PositionFolding, &folding);
    }

    pub fn set_harvester(env: Env, account: Address, allowed: bool) {
        env.storage()
            .instance()
            .set(&DataKey::Harvester(account), &allowed);
    }

    pub fn set_listed(env: Env, market: Address, listed: bool) {
        env.storage().instance().set(&DataKey::Unlisted(market), &!listed);
    }

    pub fn set_mint_paused(env: Env, market: Address, paused: bool) {
        env.storage()
            .instance()
            .set(&DataKey::MintPaused(market), &paused);
    }

    pub fn set_gauge_enabled(env: Env, enabled: bool) {
        env.storage().instance().set(&DataKey::GaugeEnabled, &enabled);
    }

    pub fn gauge_balance(env: Env, market: Address, account: Address) -> u128 {
        env.storage()
            .instance()
            .get(&DataKey::GaugeBalance(market, account))
            .unwrap_or(0)
    }

    pub fn posted_collateral(env: Env, account: Address, market: Address) -> u128 {
        posted(&env, &account, &market)
    }

    // market manager surface

    pub fn can_mint(env: Env, _market: Address, _account: Address) -> Result<(), LendingError> {
        check(&env, "can_mint")
    }

    pub fn can_redeem(
        env: Env,
        _market: Address,
        _account: Address,
        _shares: u128,
    ) -> Result<(), LendingError> {
        check(&env, "can_redeem")
    }

    pub fn can_redeem_collateral(
        env: Env,
        market: Address,
        account: Address,
        balance: u128,
        shares: u128,
        force_redeem_collateral: bool,
    ) -> Result<(), LendingError> {
        check(&env, "can_redeem_collateral")?;
        let current = posted(&env, &account, &market);
        let free = balance.saturating_sub(current);
        if shares > free {
            if !force_redeem_collateral {
                return Err(LendingError::AdmissionDenied);
            }
            set_posted(&env, &account, &market, current - (shares - free).min(current));
        }
        Ok(())
    }

    pub fn can_transfer(
        env: Env,
        _market: Address,
        _from: Address,
        _shares: u128,
    ) -> Result<(), LendingError> {
        check(&env, "can_transfer")
    }

    pub fn can_seize(
        env: Env,
        _collateral_market: Address,
        _debt_market: Address,
    ) -> Result<(), LendingError> {
        check(&env, "can_seize")
    }

    pub fn can_borrow(
        env: Env,
        _market: Address,
        _account: Address,
        _amount: u128,
    ) -> Result<(), LendingError> {
        check(&env, "can_borrow")
    }

    pub fn can_repay(env: Env, _market: Address, _account: Address) -> Result<(), LendingError> {
        check(&env, "can_repay")
    }

    pub fn can_liquidate(
        env: Env,
        _debt_market: Address,
        _collateral_market: Address,
        _borrower: Address,
        _repay_amount: u128,
    ) -> Result<(), LendingError> {
        check(&env, "can_liquidate")
    }

    pub fn calculate_liquidation(
        env: Env,
        _debt_market: Address,
        _collateral_market: Address,
        _repaid: u128,
    ) -> Result<(u128, u128), LendingError> {
        check(&env, "calculate_liquidation")?;
        Ok(env
            .storage()
            .instance()
            .get(&DataKey::Liquidation)
            .unwrap_or((0, 0)))
    }

    pub fn reduce_collateral_if_necessary(
        env: Env,
        account: Address,
        market: Address,
        balance: u128,
        shares: u128,
    ) -> Result<(), LendingError> {
        check(&env, "reduce_collateral_if_necessary")?;
        let current = posted(&env, &account, &market);
        let free = balance.saturating_sub(current);
        if shares > free {
            set_posted(&env, &account, &market, current - (shares - free).min(current));
        }
        Ok(())
    }

    pub fn post_collateral(
        env: Env,
        account: Address,
        market: Address,
        shares: u128,
    ) -> Result<(), LendingError> {
        check(&env, "post_collateral")?;
        let current = posted(&env, &account, &market);
        set_posted(&env, &account, &market, current + shares);
        Ok(())
    }

    pub fn gauge_pool(env: Env) -> Option<Address> {
        let enabled: bool = env
            .storage()
            .instance()
            .get(&DataKey::GaugeEnabled)
            .unwrap_or(false);
        if enabled {
            Some(env.current_contract_address())
        } else {
            None
        }
    }

    pub fn is_listed(env: Env, market: Address) -> bool {
        !env.storage()
            .instance()
            .get::<_, bool>(&DataKey::Unlisted(market))
            .unwrap_or(false)
    }

    pub fn mint_paused(env: Env, market: Address) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::MintPaused(market))
            .unwrap_or(false)
    }

    pub fn position_folding(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::PositionFolding)
    }

    pub fn is_harvester(env: Env, account: Address) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::Harvester(account))
            .unwrap_or(false)
    }

    // gauge pool surface

    pub fn deposit(env: Env, market: Address, account: Address, shares: u128) {
        let key = DataKey::GaugeBalance(market, account);
        let current: u128 = env.storage().instance().get(&key).unwrap_or(0);
        env.storage().instance().set(&key, &(current + shares));
    }

    pub fn withdraw(env: Env, market: Address, account: Address, shares: u128) {
        let key = DataKey::GaugeBalance(market, account);
        let current: u128 = env.storage().instance().get(&key).unwrap_or(0);
        env.storage()
            .instance()
            .set(&key, &current.saturating_sub(shares));
    }
}
