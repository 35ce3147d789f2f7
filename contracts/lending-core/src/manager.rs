use soroban_sdk::{Address, Env};

use crate::calls::admit;
use crate::errors::LendingError;
use crate::interfaces::{GaugePoolClient, MarketManagerClient};

/// Handle on the market manager of one market.
///
/// Admission methods return `AdmissionDenied` on any veto; queries that the
/// market cannot proceed without surface the same error.
#[derive(Clone)]
pub struct Manager {
    pub address: Address,
}

impl Manager {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    fn client<'a>(&self, env: &'a Env) -> MarketManagerClient<'a> {
        MarketManagerClient::new(env, &self.address)
    }

    pub fn can_mint(&self, env: &Env, account: &Address) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_mint",
            self.client(env).try_can_mint(&market, account),
        )
    }

    pub fn can_redeem(&self, env: &Env, account: &Address, shares: u128) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_redeem",
            self.client(env).try_can_redeem(&market, account, &shares),
        )
    }

    pub fn can_redeem_collateral(
        &self,
        env: &Env,
        account: &Address,
        balance: u128,
        shares: u128,
        force: bool,
    ) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_redeem_collateral",
            self.client(env).try_can_redeem_collateral(
                &market, account, &balance, &shares, &force,
            ),
        )
    }

    pub fn can_transfer(&self, env: &Env, from: &Address, shares: u128) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_transfer",
            self.client(env).try_can_transfer(&market, from, &shares),
        )
    }

    pub fn can_seize(&self, env: &Env, debt_market: &Address) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_seize",
            self.client(env).try_can_seize(&market, debt_market),
        )
    }

    pub fn can_borrow(&self, env: &Env, account: &Address, amount: u128) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_borrow",
            self.client(env).try_can_borrow(&market, account, &amount),
        )
    }

    pub fn can_repay(&self, env: &Env, account: &Address) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_repay",
            self.client(env).try_can_repay(&market, account),
        )
    }

    pub fn can_liquidate(
        &self,
        env: &Env,
        collateral_market: &Address,
        borrower: &Address,
        repay_amount: u128,
    ) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "can_liquidate",
            self.client(env)
                .try_can_liquidate(&market, collateral_market, borrower, &repay_amount),
        )
    }

    pub fn calculate_liquidation(
        &self,
        env: &Env,
        collateral_market: &Address,
        repaid: u128,
    ) -> Result<(u128, u128), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "calculate_liquidation",
            self.client(env)
                .try_calculate_liquidation(&market, collateral_market, &repaid),
        )
    }

    pub fn reduce_collateral_if_necessary(
        &self,
        env: &Env,
        account: &Address,
        balance: u128,
        shares: u128,
    ) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "reduce_collateral_if_necessary",
            self.client(env)
                .try_reduce_collateral_if_necessary(account, &market, &balance, &shares),
        )
    }

    pub fn post_collateral(&self, env: &Env, account: &Address, shares: u128) -> Result<(), LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "post_collateral",
            self.client(env).try_post_collateral(account, &market, &shares),
        )
    }

    pub fn is_listed(&self, env: &Env, market: &Address) -> Result<bool, LendingError> {
        admit(
            env,
            &self.address,
            "is_listed",
            self.client(env).try_is_listed(market),
        )
    }

    pub fn mint_paused(&self, env: &Env) -> Result<bool, LendingError> {
        let market = env.current_contract_address();
        admit(
            env,
            &self.address,
            "mint_paused",
            self.client(env).try_mint_paused(&market),
        )
    }

    pub fn position_folding(&self, env: &Env) -> Result<Option<Address>, LendingError> {
        admit(
            env,
            &self.address,
            "position_folding",
            self.client(env).try_position_folding(),
        )
    }

    pub fn is_harvester(&self, env: &Env, account: &Address) -> Result<bool, LendingError> {
        admit(
            env,
            &self.address,
            "is_harvester",
            self.client(env).try_is_harvester(account),
        )
    }

    /// Fails with `Unauthorized` unless `caller` is the registered folding contract.
    pub fn require_position_folding(&self, env: &Env, caller: &Address) -> Result<(), LendingError> {
        match self.position_folding(env)? {
            Some(folding) if folding == *caller => Ok(()),
            _ => Err(LendingError::Unauthorized),
        }
    }

    fn gauge_pool(&self, env: &Env) -> Result<Option<Address>, LendingError> {
        admit(
            env,
            &self.address,
            "gauge_pool",
            self.client(env).try_gauge_pool(),
        )
    }

    pub fn gauge_deposit(&self, env: &Env, account: &Address, shares: u128) -> Result<(), LendingError> {
        let Some(gauge) = self.gauge_pool(env)? else {
            return Ok(());
        };
        let market = env.current_contract_address();
        admit(
            env,
            &gauge,
            "deposit",
            GaugePoolClient::new(env, &gauge).try_deposit(&market, account, &shares),
        )
    }

    pub fn gauge_withdraw(&self, env: &Env, account: &Address, shares: u128) -> Result<(), LendingError> {
        let Some(gauge) = self.gauge_pool(env)? else {
            return Ok(());
        };
        let market = env.current_contract_address();
        admit(
            env,
            &gauge,
            "withdraw",
            GaugePoolClient::new(env, &gauge).try_withdraw(&market, account, &shares),
        )
    }
}
