//! ERC4626 style share vault shared by the collateral token flavors.
//!
//! Every conversion uses `stored_total_assets + pending`, where `pending` is
//! the vested but unclaimed part of the current reward window. The stored
//! total is rewritten on each mutation, folding pending in first, so two calls
//! in the same ledger always see the same exchange rate.

mod entrypoints;
mod hooks;
pub mod storage;

pub use hooks::{AdapterHooks, IdleHooks, StrategyHooks};
pub use storage::VaultConfig;

use soroban_sdk::{log, token, Address, Bytes, Env, String};
use stellar_tokens::fungible::Base as TokenBase;

use crate::constants::{MAX_EXIT_FEE, MAX_HARVEST_FEE, SEED_AMOUNT, SHARE_DECIMALS, WAD};
use crate::errors::LendingError;
use crate::events::{Deposit, Harvest, MarketStarted, SharesSeized, VestPeriodStaged, Withdraw};
use crate::interfaces::PositionFoldingClient;
use crate::manager::Manager;
use crate::math::{checked_add, checked_sub, mul_div_down, mul_div_up, to_i128, wad_mul, wad_mul_up};
use crate::shares;
use crate::vesting::{VestConfig, VestingState};

/// Core accounting surface of a share vault.
pub trait Vault {
    fn total_assets(&self, env: &Env) -> Result<u128, LendingError>;
    fn convert_to_shares(&self, env: &Env, assets: u128) -> Result<u128, LendingError>;
    fn convert_to_assets(&self, env: &Env, shares: u128) -> Result<u128, LendingError>;
    fn preview_deposit(&self, env: &Env, assets: u128) -> Result<u128, LendingError>;
    fn preview_mint(&self, env: &Env, shares: u128) -> Result<u128, LendingError>;
    fn preview_withdraw(&self, env: &Env, assets: u128) -> Result<u128, LendingError>;
    fn preview_redeem(&self, env: &Env, shares: u128) -> Result<u128, LendingError>;
    fn max_deposit(&self, env: &Env) -> Result<u128, LendingError>;
    fn max_withdraw(&self, env: &Env, owner: &Address) -> Result<u128, LendingError>;
    fn max_redeem(&self, env: &Env, owner: &Address) -> u128;

    fn deposit(
        &self,
        env: &Env,
        caller: &Address,
        assets: u128,
        receiver: &Address,
    ) -> Result<u128, LendingError>;
    fn mint(
        &self,
        env: &Env,
        caller: &Address,
        shares: u128,
        receiver: &Address,
    ) -> Result<u128, LendingError>;
    fn withdraw(
        &self,
        env: &Env,
        caller: &Address,
        assets: u128,
        receiver: &Address,
        owner: &Address,
        force_redeem_collateral: bool,
    ) -> Result<u128, LendingError>;
    fn redeem(
        &self,
        env: &Env,
        caller: &Address,
        shares: u128,
        receiver: &Address,
        owner: &Address,
        force_redeem_collateral: bool,
    ) -> Result<u128, LendingError>;
    fn seize(
        &self,
        env: &Env,
        debt_market: &Address,
        liquidator: &Address,
        account: &Address,
        liquidated_shares: u128,
        protocol_shares: u128,
    ) -> Result<(), LendingError>;
    fn start_market(&self, env: &Env, initializer: &Address) -> Result<(), LendingError>;
    fn accrue(&self, env: &Env) -> Result<u128, LendingError>;
    fn accrual_timestamp(&self, env: &Env) -> u64;
}

/// Yield compounding on top of [`Vault`].
pub trait Compounding: Vault {
    fn harvest(&self, env: &Env, harvester: &Address, data: &Bytes) -> Result<u128, LendingError>;
    fn vesting_state(&self, env: &Env) -> VestingState;
    fn vest_config(&self, env: &Env) -> Result<VestConfig, LendingError>;
    fn stage_vest_period(&self, env: &Env, vest_period: u64) -> Result<(), LendingError>;
}

/// Totals read once per entry point.
struct Snapshot {
    now: u64,
    stored: u128,
    pending: u128,
    supply: u128,
    vesting: VestingState,
}

impl Snapshot {
    fn total_assets(&self) -> Result<u128, LendingError> {
        checked_add(self.stored, self.pending)
    }

    fn to_shares(&self, assets: u128) -> Result<u128, LendingError> {
        if self.supply == 0 {
            return Ok(assets);
        }
        mul_div_down(assets, self.supply, self.total_assets()?)
    }

    fn to_shares_up(&self, assets: u128) -> Result<u128, LendingError> {
        if self.supply == 0 {
            return Ok(assets);
        }
        mul_div_up(assets, self.supply, self.total_assets()?)
    }

    fn to_assets(&self, shares: u128) -> Result<u128, LendingError> {
        if self.supply == 0 {
            return Ok(shares);
        }
        mul_div_down(shares, self.total_assets()?, self.supply)
    }

    fn to_assets_up(&self, shares: u128) -> Result<u128, LendingError> {
        if self.supply == 0 {
            return Ok(shares);
        }
        mul_div_up(shares, self.total_assets()?, self.supply)
    }

    /// Folds pending rewards in and writes the new stored total.
    fn commit(mut self, env: &Env, new_total: u128) -> Result<(), LendingError> {
        if self.pending > 0 {
            self.vesting.claim(self.now)?;
            storage::set_vesting(env, &self.vesting);
        }
        storage::set_stored_total_assets(env, new_total);
        Ok(())
    }
}

pub struct ShareVault<H: StrategyHooks> {
    pub hooks: H,
}

impl<H: StrategyHooks> ShareVault<H> {
    pub fn new(hooks: H) -> Self {
        Self { hooks }
    }

    /// Writes configuration and share metadata. `vest_period` enables vesting.
    pub fn initialize(
        env: &Env,
        config: &VaultConfig,
        vest_period: Option<u64>,
        name: String,
        symbol: String,
    ) -> Result<(), LendingError> {
        if storage::has_config(env) {
            return Err(LendingError::AlreadyInitialized);
        }
        validate_fees(config)?;
        if let Some(period) = vest_period {
            storage::set_vest_config(env, &VestConfig::new(period)?);
        }
        storage::set_config(env, config);
        storage::set_stored_total_assets(env, 0);
        TokenBase::set_metadata(env, SHARE_DECIMALS, name, symbol);
        Ok(())
    }

    pub fn config(env: &Env) -> Result<VaultConfig, LendingError> {
        storage::config(env)
    }

    pub fn update_config(env: &Env, config: &VaultConfig) -> Result<(), LendingError> {
        validate_fees(config)?;
        storage::set_config(env, config);
        Ok(())
    }

    pub fn manager(env: &Env) -> Result<Manager, LendingError> {
        Ok(Manager::new(storage::config(env)?.manager))
    }

    pub fn stored_total_assets(env: &Env) -> u128 {
        storage::stored_total_assets(env)
    }

    pub fn position_balance(&self, env: &Env) -> u128 {
        self.hooks.position_balance(env)
    }

    /// WAD scaled assets per share.
    pub fn exchange_rate(&self, env: &Env) -> Result<u128, LendingError> {
        let snapshot = Self::snapshot(env)?;
        if snapshot.supply == 0 {
            return Ok(WAD);
        }
        mul_div_down(snapshot.total_assets()?, WAD, snapshot.supply)
    }

    /// Share transfer. Posted collateral of `from` is released as far as needed.
    pub fn transfer(
        env: &Env,
        spender: Option<&Address>,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LendingError> {
        let manager = Self::manager(env)?;
        shares::transfer(env, &manager, spender, from, to, amount, true)
    }

    fn snapshot(env: &Env) -> Result<Snapshot, LendingError> {
        let now = env.ledger().timestamp();
        let vesting = storage::vesting(env);
        Ok(Snapshot {
            now,
            stored: storage::stored_total_assets(env),
            pending: vesting.pending(now)?,
            supply: shares::total_supply(env),
            vesting,
        })
    }

    fn ensure_started(env: &Env) -> Result<(), LendingError> {
        if !storage::started(env) {
            return Err(LendingError::MarketNotStarted);
        }
        Ok(())
    }

    fn exit_fee(config: &VaultConfig, assets: u128) -> Result<u128, LendingError> {
        if config.exit_fee == 0 {
            return Ok(0);
        }
        wad_mul_up(assets, config.exit_fee)
    }

    fn transfer_out(env: &Env, asset: &Address, to: &Address, amount: u128) -> Result<(), LendingError> {
        if amount == 0 {
            return Ok(());
        }
        token::Client::new(env, asset).transfer(&env.current_contract_address(), to, &to_i128(amount)?);
        Ok(())
    }

    fn process_deposit(
        &self,
        env: &Env,
        caller: &Address,
        receiver: &Address,
        assets: u128,
        shares: u128,
        snapshot: Snapshot,
    ) -> Result<(), LendingError> {
        let config = storage::config(env)?;
        let manager = Manager::new(config.manager.clone());
        let new_total = checked_add(snapshot.total_assets()?, assets)?;

        // assets land before any share exists
        token::Client::new(env, &config.asset).transfer(
            caller,
            &env.current_contract_address(),
            &to_i128(assets)?,
        );
        self.hooks.after_deposit(env, assets)?;
        snapshot.commit(env, new_total)?;

        shares::mint(env, receiver, shares)?;
        manager.gauge_deposit(env, receiver, shares)?;

        Deposit {
            caller: caller.clone(),
            owner: receiver.clone(),
            assets,
            shares,
        }
        .publish(env);
        Ok(())
    }

    /// Burns `shares` of `owner` worth `assets` and pays out net of the exit fee.
    #[allow(clippy::too_many_arguments)]
    fn process_withdraw(
        &self,
        env: &Env,
        caller: &Address,
        receiver: &Address,
        owner: &Address,
        assets: u128,
        shares: u128,
        snapshot: Snapshot,
        force_redeem_collateral: bool,
    ) -> Result<u128, LendingError> {
        if shares == 0 && assets > 0 {
            return Err(LendingError::ZeroShares);
        }
        let balance = shares::balance(env, owner);
        if shares > balance {
            return Err(LendingError::InsufficientShares);
        }
        shares::spend_allowance(env, owner, caller, shares)?;

        let config = storage::config(env)?;
        let manager = Manager::new(config.manager.clone());
        manager.can_redeem_collateral(
            env,
            owner,
            balance,
            shares,
            force_redeem_collateral,
        )?;

        let fee = Self::exit_fee(&config, assets)?;
        let payout = checked_sub(assets, fee)?;
        let new_total = checked_sub(snapshot.total_assets()?, payout)?;

        shares::burn(env, owner, shares)?;
        snapshot.commit(env, new_total)?;
        self.hooks.before_withdraw(env, payout)?;
        Self::transfer_out(env, &config.asset, receiver, payout)?;
        manager.gauge_withdraw(env, owner, shares)?;

        Withdraw {
            caller: caller.clone(),
            receiver: receiver.clone(),
            owner: owner.clone(),
            assets: payout,
            shares,
        }
        .publish(env);
        Ok(payout)
    }

    /// Deposit whose shares are immediately posted as collateral.
    pub fn deposit_as_collateral(
        &self,
        env: &Env,
        caller: &Address,
        assets: u128,
    ) -> Result<u128, LendingError> {
        let shares = self.deposit(env, caller, assets, caller)?;
        Self::manager(env)?.post_collateral(env, caller, shares)?;
        Ok(shares)
    }

    /// Redeem on behalf of `account` by the registered position folding
    /// contract, which receives the assets and a callback.
    pub fn redeem_for_position_folding(
        &self,
        env: &Env,
        position_folding: &Address,
        account: &Address,
        shares: u128,
        params: &Bytes,
    ) -> Result<u128, LendingError> {
        position_folding.require_auth();
        Self::ensure_started(env)?;
        let manager = Self::manager(env)?;
        manager.require_position_folding(env, position_folding)?;
        if shares == 0 {
            return Err(LendingError::AmountZero);
        }
        let snapshot = Self::snapshot(env)?;
        let assets = snapshot.to_assets(shares)?;
        if assets == 0 {
            return Err(LendingError::ZeroAssets);
        }
        // the folding contract acts for the account; no allowance involved
        let payout = self.process_withdraw(
            env,
            account,
            position_folding,
            account,
            assets,
            shares,
            snapshot,
            false,
        )?;
        let market = env.current_contract_address();
        PositionFoldingClient::new(env, position_folding).on_redeem(
            &market,
            account,
            &payout,
            params,
        );
        manager.can_redeem(env, account, 0)?;
        Ok(payout)
    }

    /// Moves `shares` from `account` to `liquidator` during a full account
    /// liquidation run by the market manager.
    pub fn seize_account_liquidation(
        &self,
        env: &Env,
        liquidator: &Address,
        account: &Address,
        shares: u128,
    ) -> Result<(), LendingError> {
        let manager = Self::manager(env)?;
        manager.address.require_auth();
        if liquidator == account {
            return Err(LendingError::SelfLiquidationNotAllowed);
        }
        shares::seize_shares(env, account, liquidator, shares)?;
        manager.gauge_withdraw(env, account, shares)?;
        manager.gauge_deposit(env, liquidator, shares)?;
        SharesSeized {
            liquidator: liquidator.clone(),
            account: account.clone(),
            liquidated_shares: shares,
            protocol_shares: 0,
        }
        .publish(env);
        Ok(())
    }
}

impl<H: StrategyHooks> Vault for ShareVault<H> {
    fn total_assets(&self, env: &Env) -> Result<u128, LendingError> {
        Self::snapshot(env)?.total_assets()
    }

    fn convert_to_shares(&self, env: &Env, assets: u128) -> Result<u128, LendingError> {
        Self::snapshot(env)?.to_shares(assets)
    }

    fn convert_to_assets(&self, env: &Env, shares: u128) -> Result<u128, LendingError> {
        Self::snapshot(env)?.to_assets(shares)
    }

    fn preview_deposit(&self, env: &Env, assets: u128) -> Result<u128, LendingError> {
        self.convert_to_shares(env, assets)
    }

    fn preview_mint(&self, env: &Env, shares: u128) -> Result<u128, LendingError> {
        Self::snapshot(env)?.to_assets_up(shares)
    }

    fn preview_withdraw(&self, env: &Env, assets: u128) -> Result<u128, LendingError> {
        Self::snapshot(env)?.to_shares_up(assets)
    }

    fn preview_redeem(&self, env: &Env, shares: u128) -> Result<u128, LendingError> {
        let assets = self.convert_to_assets(env, shares)?;
        let fee = Self::exit_fee(&storage::config(env)?, assets)?;
        checked_sub(assets, fee)
    }

    fn max_deposit(&self, env: &Env) -> Result<u128, LendingError> {
        if !storage::started(env) || Self::manager(env)?.mint_paused(env)? {
            return Ok(0);
        }
        Ok(i128::MAX as u128)
    }

    fn max_withdraw(&self, env: &Env, owner: &Address) -> Result<u128, LendingError> {
        self.convert_to_assets(env, shares::balance(env, owner))
    }

    fn max_redeem(&self, env: &Env, owner: &Address) -> u128 {
        shares::balance(env, owner)
    }

    fn deposit(
        &self,
        env: &Env,
        caller: &Address,
        assets: u128,
        receiver: &Address,
    ) -> Result<u128, LendingError> {
        caller.require_auth();
        Self::ensure_started(env)?;
        if assets == 0 {
            return Err(LendingError::AmountZero);
        }
        Self::manager(env)?.can_mint(env, receiver)?;
        let snapshot = Self::snapshot(env)?;
        let shares = snapshot.to_shares(assets)?;
        if shares == 0 {
            return Err(LendingError::ZeroShares);
        }
        self.process_deposit(env, caller, receiver, assets, shares, snapshot)?;
        Ok(shares)
    }

    fn mint(
        &self,
        env: &Env,
        caller: &Address,
        shares: u128,
        receiver: &Address,
    ) -> Result<u128, LendingError> {
        caller.require_auth();
        Self::ensure_started(env)?;
        if shares == 0 {
            return Err(LendingError::AmountZero);
        }
        Self::manager(env)?.can_mint(env, receiver)?;
        let snapshot = Self::snapshot(env)?;
        let assets = snapshot.to_assets_up(shares)?;
        if assets == 0 {
            return Err(LendingError::ZeroAssets);
        }
        self.process_deposit(env, caller, receiver, assets, shares, snapshot)?;
        Ok(assets)
    }

    fn withdraw(
        &self,
        env: &Env,
        caller: &Address,
        assets: u128,
        receiver: &Address,
        owner: &Address,
        force_redeem_collateral: bool,
    ) -> Result<u128, LendingError> {
        caller.require_auth();
        Self::ensure_started(env)?;
        if assets == 0 {
            return Err(LendingError::AmountZero);
        }
        let snapshot = Self::snapshot(env)?;
        let shares = snapshot.to_shares_up(assets)?;
        self.process_withdraw(
            env,
            caller,
            receiver,
            owner,
            assets,
            shares,
            snapshot,
            force_redeem_collateral,
        )?;
        Ok(shares)
    }

    fn redeem(
        &self,
        env: &Env,
        caller: &Address,
        shares: u128,
        receiver: &Address,
        owner: &Address,
        force_redeem_collateral: bool,
    ) -> Result<u128, LendingError> {
        caller.require_auth();
        Self::ensure_started(env)?;
        if shares == 0 {
            return Err(LendingError::AmountZero);
        }
        let snapshot = Self::snapshot(env)?;
        let assets = snapshot.to_assets(shares)?;
        if assets == 0 {
            return Err(LendingError::ZeroAssets);
        }
        self.process_withdraw(
            env,
            caller,
            receiver,
            owner,
            assets,
            shares,
            snapshot,
            force_redeem_collateral,
        )
    }

    fn seize(
        &self,
        env: &Env,
        debt_market: &Address,
        liquidator: &Address,
        account: &Address,
        liquidated_shares: u128,
        protocol_shares: u128,
    ) -> Result<(), LendingError> {
        debt_market.require_auth();
        if liquidator == account {
            return Err(LendingError::SelfLiquidationNotAllowed);
        }
        if protocol_shares > liquidated_shares {
            return Err(LendingError::ExcessiveValue);
        }
        let config = storage::config(env)?;
        let manager = Manager::new(config.manager.clone());
        if debt_market != &env.current_contract_address() && !manager.is_listed(env, debt_market)? {
            return Err(LendingError::Unauthorized);
        }
        manager.can_seize(env, debt_market)?;
        if shares::balance(env, account) < liquidated_shares {
            return Err(LendingError::ExcessiveValue);
        }

        let to_liquidator = liquidated_shares - protocol_shares;
        shares::seize_shares(env, account, liquidator, to_liquidator)?;
        shares::seize_shares(env, account, &config.fee_recipient, protocol_shares)?;

        manager.gauge_withdraw(env, account, liquidated_shares)?;
        if to_liquidator > 0 {
            manager.gauge_deposit(env, liquidator, to_liquidator)?;
        }
        if protocol_shares > 0 {
            manager.gauge_deposit(env, &config.fee_recipient, protocol_shares)?;
        }

        SharesSeized {
            liquidator: liquidator.clone(),
            account: account.clone(),
            liquidated_shares,
            protocol_shares,
        }
        .publish(env);
        Ok(())
    }

    fn start_market(&self, env: &Env, initializer: &Address) -> Result<(), LendingError> {
        initializer.require_auth();
        if storage::started(env) {
            return Err(LendingError::MarketAlreadyStarted);
        }
        let config = storage::config(env)?;
        let vault = env.current_contract_address();
        token::Client::new(env, &config.asset).transfer(initializer, &vault, &to_i128(SEED_AMOUNT)?);
        self.hooks.after_deposit(env, SEED_AMOUNT)?;

        let snapshot = Self::snapshot(env)?;
        let shares = snapshot.to_shares(SEED_AMOUNT)?;
        let new_total = checked_add(snapshot.total_assets()?, SEED_AMOUNT)?;
        snapshot.commit(env, new_total)?;
        shares::mint(env, &vault, shares)?;
        storage::set_started(env);

        MarketStarted {
            initializer: initializer.clone(),
            assets: SEED_AMOUNT,
        }
        .publish(env);
        Ok(())
    }

    fn accrue(&self, env: &Env) -> Result<u128, LendingError> {
        let snapshot = Self::snapshot(env)?;
        let released = snapshot.pending;
        let new_total = snapshot.total_assets()?;
        if snapshot.vesting.is_vesting() && snapshot.vesting.last_vest_claim < snapshot.now {
            let mut vesting = snapshot.vesting;
            vesting.claim(snapshot.now)?;
            storage::set_vesting(env, &vesting);
            storage::set_stored_total_assets(env, new_total);
        }
        Ok(released)
    }

    fn accrual_timestamp(&self, env: &Env) -> u64 {
        let now = env.ledger().timestamp();
        let vesting = storage::vesting(env);
        if vesting.is_vesting() && vesting.last_vest_claim < now {
            vesting.last_vest_claim
        } else {
            now
        }
    }
}

impl<H: StrategyHooks> Compounding for ShareVault<H> {
    /// Canonical order: vest pending, apply a staged period, claim, take the
    /// fee, compound, open the next window. Returns the yield being vested.
    fn harvest(&self, env: &Env, harvester: &Address, data: &Bytes) -> Result<u128, LendingError> {
        harvester.require_auth();
        Self::ensure_started(env)?;
        if storage::compounding_paused(env) {
            return Err(LendingError::CompoundingPaused);
        }
        let config = storage::config(env)?;
        let manager = Manager::new(config.manager.clone());
        if !manager.is_harvester(env, harvester)? {
            return Err(LendingError::Unauthorized);
        }

        let snapshot = Self::snapshot(env)?;
        if !snapshot.vesting.window_elapsed(snapshot.now) {
            return Ok(0);
        }
        let now = snapshot.now;
        let mut vesting = snapshot.vesting.clone();
        let mut stored = snapshot.total_assets()?;
        vesting.claim(now)?;

        let mut vest_config = storage::vest_config(env).ok_or(LendingError::NotInitialized)?;
        if vest_config.apply_staged() {
            storage::set_vest_config(env, &vest_config);
        }

        let rewards = self.hooks.claim_rewards(env, data)?;
        if rewards == 0 {
            storage::set_vesting(env, &vesting);
            storage::set_stored_total_assets(env, stored);
            return Ok(0);
        }

        let fee = wad_mul(rewards, config.harvest_fee)?;
        Self::transfer_out(env, &config.asset, &config.fee_recipient, fee)?;
        let compounded = rewards - fee;
        self.hooks.after_deposit(env, compounded)?;

        vesting.start(compounded, now, vest_config.vest_period)?;
        // rounding dust of the reward rate is credited immediately
        let streamed = mul_div_down(vesting.reward_rate, vest_config.vest_period as u128, WAD)?;
        stored = checked_add(stored, compounded - streamed)?;
        storage::set_vesting(env, &vesting);
        storage::set_stored_total_assets(env, stored);

        log!(env, "harvest", rewards, fee, vesting.vesting_period_end);
        Harvest {
            harvester: harvester.clone(),
            yield_amount: compounded,
            protocol_fee: fee,
            vesting_period_end: vesting.vesting_period_end,
        }
        .publish(env);
        Ok(compounded)
    }

    fn vesting_state(&self, env: &Env) -> VestingState {
        storage::vesting(env)
    }

    fn vest_config(&self, env: &Env) -> Result<VestConfig, LendingError> {
        storage::vest_config(env).ok_or(LendingError::NotInitialized)
    }

    fn stage_vest_period(&self, env: &Env, vest_period: u64) -> Result<(), LendingError> {
        let mut config = self.vest_config(env)?;
        config.stage(vest_period)?;
        storage::set_vest_config(env, &config);
        VestPeriodStaged {
            new_vest_period: vest_period,
        }
        .publish(env);
        Ok(())
    }
}

pub fn set_compounding_paused(env: &Env, paused: bool) {
    storage::set_compounding_paused(env, paused);
}

pub fn compounding_paused(env: &Env) -> bool {
    storage::compounding_paused(env)
}

fn validate_fees(config: &VaultConfig) -> Result<(), LendingError> {
    if config.exit_fee > MAX_EXIT_FEE {
        return Err(LendingError::InvalidExitFee);
    }
    if config.harvest_fee > MAX_HARVEST_FEE {
        return Err(LendingError::InvalidHarvestFee);
    }
    Ok(())
}
