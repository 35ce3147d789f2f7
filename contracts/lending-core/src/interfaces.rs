//! Client surfaces of the collaborators every market talks to.

use soroban_sdk::{contractclient, Address, Bytes, Env};

use crate::errors::LendingError;

/// Risk and liquidity oracle. Admission calls succeed or fail, nothing else.
#[contractclient(name = "MarketManagerClient")]
pub trait MarketManager {
    fn can_mint(env: Env, market: Address, account: Address);
    fn can_redeem(env: Env, market: Address, account: Address, shares: u128);
    fn can_redeem_collateral(
        env: Env,
        market: Address,
        account: Address,
        balance: u128,
        shares: u128,
        force_redeem_collateral: bool,
    );
    fn can_transfer(env: Env, market: Address, from: Address, shares: u128);
    fn can_seize(env: Env, collateral_market: Address, debt_market: Address);
    fn can_borrow(env: Env, market: Address, account: Address, amount: u128);
    fn can_repay(env: Env, market: Address, account: Address);
    fn can_liquidate(
        env: Env,
        debt_market: Address,
        collateral_market: Address,
        borrower: Address,
        repay_amount: u128,
    );
    /// Returns `(liquidated_shares, protocol_shares)` for an actual repayment.
    fn calculate_liquidation(
        env: Env,
        debt_market: Address,
        collateral_market: Address,
        repaid: u128,
    ) -> (u128, u128);
    fn reduce_collateral_if_necessary(
        env: Env,
        account: Address,
        market: Address,
        balance: u128,
        shares: u128,
    );
    fn post_collateral(env: Env, account: Address, market: Address, shares: u128);
    fn gauge_pool(env: Env) -> Option<Address>;
    fn is_listed(env: Env, market: Address) -> bool;
    fn mint_paused(env: Env, market: Address) -> bool;
    fn position_folding(env: Env) -> Option<Address>;
    fn is_harvester(env: Env, account: Address) -> bool;
}

#[contractclient(name = "GaugePoolClient")]
pub trait GaugePool {
    fn deposit(env: Env, market: Address, account: Address, shares: u128);
    fn withdraw(env: Env, market: Address, account: Address, shares: u128);
}

#[contractclient(name = "InterestRateModelClient")]
pub trait InterestRateModel {
    fn get_borrow_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, LendingError>;
    fn get_borrow_rate_with_update(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
    ) -> Result<u128, LendingError>;
    fn get_supply_rate(
        env: Env,
        cash: u128,
        borrows: u128,
        reserves: u128,
        reserve_factor: u128,
    ) -> Result<u128, LendingError>;
    fn is_interest_rate_model(env: Env) -> bool;
}

/// Callbacks into the manager's registered position folding contract.
#[contractclient(name = "PositionFoldingClient")]
pub trait PositionFolding {
    fn on_borrow(env: Env, market: Address, account: Address, amount: u128, params: Bytes);
    fn on_redeem(env: Env, market: Address, account: Address, amount: u128, params: Bytes);
}

/// External yield source behind a compounding vault. The vault pushes
/// assets before `deposit`; `withdraw` and `claim` push assets back.
#[contractclient(name = "StrategyAdapterClient")]
pub trait StrategyAdapter {
    fn deposit(env: Env, vault: Address, amount: u128) -> Result<(), LendingError>;
    fn withdraw(env: Env, vault: Address, amount: u128) -> Result<(), LendingError>;
    fn claim(env: Env, vault: Address, data: Bytes) -> Result<u128, LendingError>;
    fn balance(env: Env, vault: Address) -> u128;
}

/// What a debt market needs from the market it seizes collateral in.
#[contractclient(name = "CollateralMarketClient")]
pub trait CollateralMarket {
    fn seize(
        env: Env,
        debt_market: Address,
        liquidator: Address,
        account: Address,
        liquidated_shares: u128,
        protocol_shares: u128,
    ) -> Result<(), LendingError>;
    fn accrual_timestamp(env: Env) -> u64;
    fn balance(env: Env, id: Address) -> i128;
}
