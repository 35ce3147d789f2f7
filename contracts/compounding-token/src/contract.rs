use lending_core::constants::{MAX_EXIT_FEE, MAX_HARVEST_FEE};
use lending_core::events::{CompoundingPaused, ExitFeeUpdated, NewAdmin};
use lending_core::guard::ReentrancyGuard;
use lending_core::share_vault_entrypoints;
use lending_core::storage::{require, store};
use lending_core::vault::{self, AdapterHooks, Compounding, ShareVault, VaultConfig};
use lending_core::vesting::{VestConfig, VestingState};
use lending_core::LendingError;
use soroban_sdk::{contract, contractimpl, contracttype, Address, Bytes, Env, String};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Strategy,
}

type CompoundingVault = ShareVault<AdapterHooks>;

#[contract]
pub struct CompoundingToken;

fn share_vault(env: &Env) -> Result<CompoundingVault, LendingError> {
    let config = CompoundingVault::config(env)?;
    Ok(ShareVault::new(AdapterHooks {
        asset: config.asset,
        adapter: require(env, &DataKey::Strategy)?,
    }))
}

fn require_admin(env: &Env) -> Result<Address, LendingError> {
    let admin: Address = require(env, &DataKey::Admin)?;
    admin.require_auth();
    Ok(admin)
}

#[contractimpl]
impl CompoundingToken {
    /// Compounding cToken: deposits go to `strategy`, harvested yield is
    /// vested linearly over `vest_period` seconds.
    pub fn initialize(
        env: Env,
        admin: Address,
        config: VaultConfig,
        strategy: Address,
        vest_period: u64,
        name: String,
        symbol: String,
    ) -> Result<(), LendingError> {
        admin.require_auth();
        CompoundingVault::initialize(&env, &config, Some(vest_period), name, symbol)?;
        store(&env, &DataKey::Admin, &admin);
        store(&env, &DataKey::Strategy, &strategy);
        Ok(())
    }

    // compounding

    pub fn harvest(env: Env, harvester: Address, data: Bytes) -> Result<u128, LendingError> {
        let _guard = ReentrancyGuard::acquire(&env)?;
        share_vault(&env)?.harvest(&env, &harvester, &data)
    }

    /// Takes effect at the start of the next harvest.
    pub fn stage_vest_period(env: Env, vest_period: u64) -> Result<(), LendingError> {
        require_admin(&env)?;
        share_vault(&env)?.stage_vest_period(&env, vest_period)
    }

    pub fn set_compounding_paused(env: Env, paused: bool) -> Result<(), LendingError> {
        require_admin(&env)?;
        vault::set_compounding_paused(&env, paused);
        CompoundingPaused { paused }.publish(&env);
        Ok(())
    }

    pub fn set_exit_fee(env: Env, exit_fee: u128) -> Result<(), LendingError> {
        require_admin(&env)?;
        if exit_fee > MAX_EXIT_FEE {
            return Err(LendingError::InvalidExitFee);
        }
        let mut config = CompoundingVault::config(&env)?;
        config.exit_fee = exit_fee;
        CompoundingVault::update_config(&env, &config)?;
        ExitFeeUpdated { exit_fee }.publish(&env);
        Ok(())
    }

    pub fn set_harvest_fee(env: Env, harvest_fee: u128) -> Result<(), LendingError> {
        require_admin(&env)?;
        if harvest_fee > MAX_HARVEST_FEE {
            return Err(LendingError::InvalidHarvestFee);
        }
        let mut config = CompoundingVault::config(&env)?;
        config.harvest_fee = harvest_fee;
        CompoundingVault::update_config(&env, &config)
    }

    pub fn set_fee_recipient(env: Env, recipient: Address) -> Result<(), LendingError> {
        require_admin(&env)?;
        let mut config = CompoundingVault::config(&env)?;
        config.fee_recipient = recipient;
        CompoundingVault::update_config(&env, &config)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), LendingError> {
        require_admin(&env)?;
        store(&env, &DataKey::Admin, &new_admin);
        NewAdmin { admin: new_admin }.publish(&env);
        Ok(())
    }

    // views

    pub fn admin(env: Env) -> Result<Address, LendingError> {
        require(&env, &DataKey::Admin)
    }

    pub fn strategy(env: Env) -> Result<Address, LendingError> {
        require(&env, &DataKey::Strategy)
    }

    pub fn compounding_paused(env: Env) -> bool {
        vault::compounding_paused(&env)
    }

    pub fn vesting_state(env: Env) -> Result<VestingState, LendingError> {
        Ok(share_vault(&env)?.vesting_state(&env))
    }

    pub fn vest_config(env: Env) -> Result<VestConfig, LendingError> {
        share_vault(&env)?.vest_config(&env)
    }

    /// Vested yield not yet folded into the stored total.
    pub fn pending_rewards(env: Env) -> Result<u128, LendingError> {
        share_vault(&env)?
            .vesting_state(&env)
            .pending(env.ledger().timestamp())
    }
}

share_vault_entrypoints!(CompoundingToken, CompoundingVault, share_vault);
