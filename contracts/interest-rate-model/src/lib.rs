#![no_std]
use lending_core::constants::WAD;
use lending_core::rate_curve::{utilization_rate, CurveConfig};
use lending_core::storage::{require, store};
use lending_core::LendingError;
use soroban_sdk::{contract, contractevent, contractimpl, contracttype, Address, Env};

#[contracttype]
pub enum DataKey {
    Admin,
    Curve, // CurveConfig, per second WAD rates
}

#[contract]
pub struct InterestRateModel;

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRateConfiguration {
    pub base_rate: u128,
    pub vertex_rate: u128,
    pub vertex_start: u128,
}

#[contractimpl]
impl InterestRateModel {
    pub fn initialize(
        env: Env,
        admin: Address,
        base_rate: u128,
        vertex_rate: u128,
        vertex_start: u128,
    ) -> Result<(), LendingError> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(LendingError::AlreadyInitialized);
        }
        admin.require_auth();
        store(&env, &DataKey::Admin, &admin);
        write_curve(
            &env,
            CurveConfig {
                base_rate,
                vertex_rate,
                vertex_start,
            },
        )
    }

    pub fn update_configuration(
        env: Env,
        base_rate: u128,
        vertex_rate: u128,
        vertex_start: u128,
    ) -> Result<(), LendingError> {
        require_admin(&env)?;
        write_curve(
            &env,
            CurveConfig {
                base_rate,
                vertex_rate,
                vertex_start,
            },
        )
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
        let curve = curve(&env)?;
        curve.borrow_rate(utilization_rate(cash, borrows, reserves)?, WAD)
    }

    /// Same as `get_borrow_rate`: the static curve has nothing to update.
    pub fn get_borrow_rate_with_update(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, LendingError> {
        Self::get_borrow_rate(env, cash, borrows, reserves)
    }

    pub fn get_supply_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
        reserve_factor: u128,
    ) -> Result<u128, LendingError> {
        let curve = curve(&env)?;
        curve.supply_rate(utilization_rate(cash, borrows, reserves)?, WAD, reserve_factor)
    }

    pub fn is_interest_rate_model(_env: Env) -> bool {
        true
    }

    pub fn config(env: Env) -> Result<CurveConfig, LendingError> {
        curve(&env)
    }

    pub fn admin(env: Env) -> Result<Address, LendingError> {
        require(&env, &DataKey::Admin)
    }
}

fn curve(env: &Env) -> Result<CurveConfig, LendingError> {
    require(env, &DataKey::Curve)
}

fn write_curve(env: &Env, curve: CurveConfig) -> Result<(), LendingError> {
    curve.validate()?;
    store(env, &DataKey::Curve, &curve);
    NewRateConfiguration {
        base_rate: curve.base_rate,
        vertex_rate: curve.vertex_rate,
        vertex_start: curve.vertex_start,
    }
    .publish(env);
    Ok(())
}

fn require_admin(env: &Env) -> Result<(), LendingError> {
    let admin: Address = require(env, &DataKey::Admin)?;
    admin.require_auth();
    Ok(())
}
