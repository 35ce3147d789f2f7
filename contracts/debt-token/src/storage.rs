use lending_core::storage::{load, load_or, require, store};
use lending_core::LendingError;
use soroban_sdk::{contracttype, Address, Env};

#[contracttype]
pub enum DataKey {
    Admin,
    Underlying,
    MarketManager,
    InterestRateModel,
    ReserveFactor, // u128, WAD scaled
    FeeRecipient,  // receives the protocol cut of seized dToken shares
    MarketState,
    DebtPositions(Address),
    Started,
}

/// Per account borrow snapshot.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DebtPosition {
    pub principal: u128,
    pub interest_index: u128,
}

/// Global debt side totals. Always read and written as one record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DebtMarketState {
    pub total_borrows: u128,
    pub total_reserves: u128,
    pub borrow_index: u128,
    pub accrual_timestamp: u64,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().persistent().has(&DataKey::Underlying)
}

pub fn admin(env: &Env) -> Result<Address, LendingError> {
    require(env, &DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    store(env, &DataKey::Admin, admin);
}

pub fn require_admin(env: &Env) -> Result<Address, LendingError> {
    let admin = admin(env)?;
    admin.require_auth();
    Ok(admin)
}

pub fn underlying(env: &Env) -> Result<Address, LendingError> {
    require(env, &DataKey::Underlying)
}

pub fn set_underlying(env: &Env, underlying: &Address) {
    store(env, &DataKey::Underlying, underlying);
}

pub fn market_manager(env: &Env) -> Result<Address, LendingError> {
    require(env, &DataKey::MarketManager)
}

pub fn set_market_manager(env: &Env, manager: &Address) {
    store(env, &DataKey::MarketManager, manager);
}

pub fn interest_rate_model(env: &Env) -> Result<Address, LendingError> {
    require(env, &DataKey::InterestRateModel)
}

pub fn set_interest_rate_model(env: &Env, model: &Address) {
    store(env, &DataKey::InterestRateModel, model);
}

pub fn reserve_factor(env: &Env) -> u128 {
    load_or(env, &DataKey::ReserveFactor, 0u128)
}

pub fn set_reserve_factor(env: &Env, reserve_factor: u128) {
    store(env, &DataKey::ReserveFactor, &reserve_factor);
}

pub fn fee_recipient(env: &Env) -> Result<Address, LendingError> {
    require(env, &DataKey::FeeRecipient)
}

pub fn set_fee_recipient(env: &Env, recipient: &Address) {
    store(env, &DataKey::FeeRecipient, recipient);
}

pub fn market_state(env: &Env) -> Result<DebtMarketState, LendingError> {
    require(env, &DataKey::MarketState)
}

pub fn set_market_state(env: &Env, state: &DebtMarketState) {
    store(env, &DataKey::MarketState, state);
}

pub fn debt_position(env: &Env, account: &Address) -> DebtPosition {
    load(env, &DataKey::DebtPositions(account.clone())).unwrap_or_default()
}

pub fn set_debt_position(env: &Env, account: &Address, position: &DebtPosition) {
    store(env, &DataKey::DebtPositions(account.clone()), position);
}

pub fn started(env: &Env) -> bool {
    load_or(env, &DataKey::Started, false)
}

pub fn set_started(env: &Env) {
    store(env, &DataKey::Started, &true);
}
