#![no_std]
//! Strategy adapter for tests: holds vault assets and pays out a configured
//! yield on the next claim. The yield must be funded by minting the asset to
//! this contract.

use lending_core::LendingError;
use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Bytes, Env};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Asset,
    Position(Address),
    PendingYield,
    Claims,
}

#[contract]
pub struct MockStrategy;

fn asset(env: &Env) -> Result<Address, LendingError> {
    env.storage()
        .instance()
        .get(&DataKey::Asset)
        .ok_or(LendingError::NotInitialized)
}

fn position(env: &Env, vault: &Address) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::Position(vault.clone()))
        .unwrap_or(0)
}

#[contractimpl]
impl MockStrategy {
    pub fn initialize(env: Env, asset: Address) {
        env.storage().instance().set(&DataKey::Asset, &asset);
    }

    pub fn set_pending_yield(env: Env, amount: u128) {
        env.storage().instance().set(&DataKey::PendingYield, &amount);
    }

    pub fn claims(env: Env) -> u32 {
        env.storage().instance().get(&DataKey::Claims).unwrap_or(0)
    }

    pub fn deposit(env: Env, vault: Address, amount: u128) -> Result<(), LendingError> {
        vault.require_auth();
        let updated = position(&env, &vault) + amount;
        env.storage()
            .instance()
            .set(&DataKey::Position(vault), &updated);
        Ok(())
    }

    pub fn withdraw(env: Env, vault: Address, amount: u128) -> Result<(), LendingError> {
        vault.require_auth();
        let current = position(&env, &vault);
        if amount > current {
            return Err(LendingError::CashNotAvailable);
        }
        env.storage()
            .instance()
            .set(&DataKey::Position(vault.clone()), &(current - amount));
        token::Client::new(&env, &asset(&env)?).transfer(
            &env.current_contract_address(),
            &vault,
            &(amount as i128),
        );
        Ok(())
    }

    pub fn claim(env: Env, vault: Address, _data: Bytes) -> Result<u128, LendingError> {
        vault.require_auth();
        let claims = Self::claims(env.clone());
        env.storage().instance().set(&DataKey::Claims, &(claims + 1));
        let amount: u128 = env
            .storage()
            .instance()
            .get(&DataKey::PendingYield)
            .unwrap_or(0);
        if amount == 0 {
            return Ok(0);
        }
        env.storage().instance().set(&DataKey::PendingYield, &0u128);
        token::Client::new(&env, &asset(&env)?).transfer(
            &env.current_contract_address(),
            &vault,
            &(amount as i128),
        );
        Ok(amount)
    }

    pub fn balance(env: Env, vault: Address) -> u128 {
        position(&env, &vault)
    }
}
