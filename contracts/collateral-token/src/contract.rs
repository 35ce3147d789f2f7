use lending_core::events::NewAdmin;
use lending_core::share_vault_entrypoints;
use lending_core::storage::{require, store};
use lending_core::vault::{IdleHooks, ShareVault, VaultConfig};
use lending_core::LendingError;
use soroban_sdk::{contract, contractimpl, contracttype, Address, Bytes, Env, String};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
}

type CollateralVault = ShareVault<IdleHooks>;

#[contract]
pub struct CollateralToken;

fn share_vault(env: &Env) -> Result<CollateralVault, LendingError> {
    let config = CollateralVault::config(env)?;
    Ok(ShareVault::new(IdleHooks {
        asset: config.asset,
    }))
}

fn require_admin(env: &Env) -> Result<Address, LendingError> {
    let admin: Address = require(env, &DataKey::Admin)?;
    admin.require_auth();
    Ok(admin)
}

#[contractimpl]
impl CollateralToken {
    /// Primitive cToken: assets sit idle in the contract and the exchange
    /// rate only moves through rounding.
    pub fn initialize(
        env: Env,
        admin: Address,
        asset: Address,
        market_manager: Address,
        fee_recipient: Address,
        name: String,
        symbol: String,
    ) -> Result<(), LendingError> {
        admin.require_auth();
        let config = VaultConfig {
            asset,
            manager: market_manager,
            fee_recipient,
            exit_fee: 0,
            harvest_fee: 0,
        };
        CollateralVault::initialize(&env, &config, None, name, symbol)?;
        store(&env, &DataKey::Admin, &admin);
        Ok(())
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), LendingError> {
        require_admin(&env)?;
        store(&env, &DataKey::Admin, &new_admin);
        NewAdmin { admin: new_admin }.publish(&env);
        Ok(())
    }

    pub fn set_fee_recipient(env: Env, recipient: Address) -> Result<(), LendingError> {
        require_admin(&env)?;
        let mut config = CollateralVault::config(&env)?;
        config.fee_recipient = recipient;
        CollateralVault::update_config(&env, &config)
    }

    pub fn admin(env: Env) -> Result<Address, LendingError> {
        require(&env, &DataKey::Admin)
    }
}

share_vault_entrypoints!(CollateralToken, CollateralVault, share_vault);
