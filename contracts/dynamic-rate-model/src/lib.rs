#![no_std]
//! Two-slope rate model whose vertex slope is scaled by a multiplier that
//! follows utilization. The multiplier moves at most once per
//! `adjustment_rate` window and only when the linked debt market accrues.

use lending_core::rate_curve::{utilization_rate, AdjustmentConfig, CurveConfig, DynamicRateState};
use lending_core::storage::{load, require, store};
use lending_core::LendingError;
use soroban_sdk::{contract, contractevent, contractimpl, contracttype, log, Address, Env};

#[contracttype]
pub enum DataKey {
    Admin,
    Curve,
    Adjustment,
    State,
    LinkedMarket,
}

#[contract]
pub struct DynamicRateModel;

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRateConfiguration {
    pub curve: CurveConfig,
    pub adjustment: AdjustmentConfig,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexMultiplierUpdated {
    pub utilization: u128,
    pub vertex_multiplier: u128,
    pub next_update_timestamp: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketLinked {
    #[topic]
    pub market: Address,
}

#[contractimpl]
impl DynamicRateModel {
    pub fn initialize(
        env: Env,
        admin: Address,
        curve: CurveConfig,
        adjustment: AdjustmentConfig,
    ) -> Result<(), LendingError> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(LendingError::AlreadyInitialized);
        }
        admin.require_auth();
        curve.validate()?;
        adjustment.validate(&curve)?;
        let state = DynamicRateState {
            vertex_multiplier: lending_core::constants::WAD,
            next_update_timestamp: env.ledger().timestamp() + adjustment.adjustment_rate,
        };
        store(&env, &DataKey::Admin, &admin);
        store(&env, &DataKey::State, &state);
        write_configuration(&env, curve, adjustment);
        Ok(())
    }

    /// Binds the model to the debt market allowed to move the multiplier.
    pub fn link_market(env: Env, market: Address) -> Result<(), LendingError> {
        require_admin(&env)?;
        store(&env, &DataKey::LinkedMarket, &market);
        MarketLinked { market }.publish(&env);
        Ok(())
    }

    pub fn update_configuration(
        env: Env,
        curve: CurveConfig,
        adjustment: AdjustmentConfig,
    ) -> Result<(), LendingError> {
        require_admin(&env)?;
        curve.validate()?;
        adjustment.validate(&curve)?;
        let mut state = rate_state(&env)?;
        state.vertex_multiplier = state
            .vertex_multiplier
            .clamp(lending_core::constants::WAD, adjustment.vertex_multiplier_max);
        store(&env, &DataKey::State, &state);
        write_configuration(&env, curve, adjustment);
        Ok(())
    }

    pub fn utilization_rate(
        _env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, LendingError> {
        utilization_rate(cash, borrows, reserves)
    }

    pub fn get_borrow_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, LendingError> {
        let curve: CurveConfig = require(&env, &DataKey::Curve)?;
        let state = rate_state(&env)?;
        curve.borrow_rate(
            utilization_rate(cash, borrows, reserves)?,
            state.vertex_multiplier,
        )
    }

    /// Rate used for accrual. Moves the multiplier first when the current
    /// window has ended. Only the linked market may call it.
    pub fn get_borrow_rate_with_update(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, LendingError> {
        let market: Address =
            load(&env, &DataKey::LinkedMarket).ok_or(LendingError::Unauthorized)?;
        market.require_auth();

        let curve: CurveConfig = require(&env, &DataKey::Curve)?;
        let adjustment: AdjustmentConfig = require(&env, &DataKey::Adjustment)?;
        let mut state = rate_state(&env)?;
        let util = utilization_rate(cash, borrows, reserves)?;

        let now = env.ledger().timestamp();
        if now >= state.next_update_timestamp {
            state.vertex_multiplier = adjustment.next_multiplier(util, state.vertex_multiplier)?;
            state.next_update_timestamp = now + adjustment.adjustment_rate;
            store(&env, &DataKey::State, &state);
            log!(&env, "vertex multiplier", util, state.vertex_multiplier);
            VertexMultiplierUpdated {
                utilization: util,
                vertex_multiplier: state.vertex_multiplier,
                next_update_timestamp: state.next_update_timestamp,
            }
            .publish(&env);
        }
        curve.borrow_rate(util, state.vertex_multiplier)
    }

    pub fn get_supply_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
        reserve_factor: u128,
    ) -> Result<u128, LendingError> {
        let curve: CurveConfig = require(&env, &DataKey::Curve)?;
        let state = rate_state(&env)?;
        curve.supply_rate(
            utilization_rate(cash, borrows, reserves)?,
            state.vertex_multiplier,
            reserve_factor,
        )
    }

    pub fn is_interest_rate_model(_env: Env) -> bool {
        true
    }

    pub fn vertex_multiplier(env: Env) -> Result<u128, LendingError> {
        Ok(rate_state(&env)?.vertex_multiplier)
    }

    pub fn rate_state(env: Env) -> Result<DynamicRateState, LendingError> {
        rate_state(&env)
    }

    pub fn curve(env: Env) -> Result<CurveConfig, LendingError> {
        require(&env, &DataKey::Curve)
    }

    pub fn adjustment(env: Env) -> Result<AdjustmentConfig, LendingError> {
        require(&env, &DataKey::Adjustment)
    }

    pub fn linked_market(env: Env) -> Option<Address> {
        load(&env, &DataKey::LinkedMarket)
    }
}

fn rate_state(env: &Env) -> Result<DynamicRateState, LendingError> {
    require(env, &DataKey::State)
}

fn write_configuration(env: &Env, curve: CurveConfig, adjustment: AdjustmentConfig) {
    store(env, &DataKey::Curve, &curve);
    store(env, &DataKey::Adjustment, &adjustment);
    NewRateConfiguration { curve, adjustment }.publish(env);
}

fn require_admin(env: &Env) -> Result<(), LendingError> {
    let admin: Address = require(env, &DataKey::Admin)?;
    admin.require_auth();
    Ok(())
}

#[cfg(test)]
mod test;
