use soroban_sdk::{token, Address, Bytes, Env};

use crate::calls::forward;
use crate::errors::LendingError;
use crate::interfaces::StrategyAdapterClient;
use crate::math::{to_i128, to_u128};

/// The only surface that differs between vault flavors.
pub trait StrategyHooks {
    /// Assets already sit in the vault; put them to work.
    fn after_deposit(&self, env: &Env, assets: u128) -> Result<(), LendingError>;
    /// Bring `assets` back into the vault before they are paid out.
    fn before_withdraw(&self, env: &Env, assets: u128) -> Result<(), LendingError>;
    /// Collect external yield into the vault and report how much arrived.
    fn claim_rewards(&self, env: &Env, data: &Bytes) -> Result<u128, LendingError>;
    /// Assets the vault actually controls right now.
    fn position_balance(&self, env: &Env) -> u128;
}

/// Assets stay idle in the vault contract.
pub struct IdleHooks {
    pub asset: Address,
}

impl StrategyHooks for IdleHooks {
    fn after_deposit(&self, _env: &Env, _assets: u128) -> Result<(), LendingError> {
        Ok(())
    }

    fn before_withdraw(&self, _env: &Env, _assets: u128) -> Result<(), LendingError> {
        Ok(())
    }

    fn claim_rewards(&self, _env: &Env, _data: &Bytes) -> Result<u128, LendingError> {
        Ok(0)
    }

    fn position_balance(&self, env: &Env) -> u128 {
        to_u128(token::Client::new(env, &self.asset).balance(&env.current_contract_address()))
    }
}

/// Assets are parked in an external strategy adapter.
pub struct AdapterHooks {
    pub asset: Address,
    pub adapter: Address,
}

impl AdapterHooks {
    fn client<'a>(&self, env: &'a Env) -> StrategyAdapterClient<'a> {
        StrategyAdapterClient::new(env, &self.adapter)
    }
}

impl StrategyHooks for AdapterHooks {
    fn after_deposit(&self, env: &Env, assets: u128) -> Result<(), LendingError> {
        if assets == 0 {
            return Ok(());
        }
        let vault = env.current_contract_address();
        token::Client::new(env, &self.asset).transfer(&vault, &self.adapter, &to_i128(assets)?);
        forward(
            env,
            &self.adapter,
            "deposit",
            self.client(env).try_deposit(&vault, &assets),
        )
    }

    fn before_withdraw(&self, env: &Env, assets: u128) -> Result<(), LendingError> {
        if assets == 0 {
            return Ok(());
        }
        let vault = env.current_contract_address();
        forward(
            env,
            &self.adapter,
            "withdraw",
            self.client(env).try_withdraw(&vault, &assets),
        )
    }

    fn claim_rewards(&self, env: &Env, data: &Bytes) -> Result<u128, LendingError> {
        let vault = env.current_contract_address();
        forward(
            env,
            &self.adapter,
            "claim",
            self.client(env).try_claim(&vault, data),
        )
    }

    fn position_balance(&self, env: &Env) -> u128 {
        self.client(env).balance(&env.current_contract_address())
    }
}
