use soroban_sdk::{contracttype, Address, Env};

use crate::errors::LendingError;
use crate::storage::{load, load_or, require, store};
use crate::vesting::{VestConfig, VestingState};

#[contracttype]
#[derive(Clone)]
pub enum VaultKey {
    Config,
    TotalAssets,
    Vesting,
    VestConfig,
    CompoundingPaused,
    Started,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    pub asset: Address,
    pub manager: Address,
    /// Receives the protocol cut of seizes and the harvest fee.
    pub fee_recipient: Address,
    /// WAD scaled share of withdrawn assets left in the vault.
    pub exit_fee: u128,
    /// WAD scaled share of harvested yield sent to `fee_recipient`.
    pub harvest_fee: u128,
}

pub fn has_config(env: &Env) -> bool {
    env.storage().persistent().has(&VaultKey::Config)
}

pub fn config(env: &Env) -> Result<VaultConfig, LendingError> {
    require(env, &VaultKey::Config)
}

pub fn set_config(env: &Env, config: &VaultConfig) {
    store(env, &VaultKey::Config, config);
}

pub fn stored_total_assets(env: &Env) -> u128 {
    load_or(env, &VaultKey::TotalAssets, 0u128)
}

pub fn set_stored_total_assets(env: &Env, total: u128) {
    store(env, &VaultKey::TotalAssets, &total);
}

pub fn vesting(env: &Env) -> VestingState {
    load_or(env, &VaultKey::Vesting, VestingState::default())
}

pub fn set_vesting(env: &Env, state: &VestingState) {
    store(env, &VaultKey::Vesting, state);
}

pub fn vest_config(env: &Env) -> Option<VestConfig> {
    load(env, &VaultKey::VestConfig)
}

pub fn set_vest_config(env: &Env, config: &VestConfig) {
    store(env, &VaultKey::VestConfig, config);
}

pub fn compounding_paused(env: &Env) -> bool {
    load_or(env, &VaultKey::CompoundingPaused, false)
}

pub fn set_compounding_paused(env: &Env, paused: bool) {
    store(env, &VaultKey::CompoundingPaused, &paused);
}

pub fn started(env: &Env) -> bool {
    load_or(env, &VaultKey::Started, false)
}

pub fn set_started(env: &Env) {
    store(env, &VaultKey::Started, &true);
}
