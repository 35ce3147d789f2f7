#![cfg(test)]

use crate::{DebtToken, DebtTokenClient, LiquidationOutcome};
use collateral_token::{CollateralToken, CollateralTokenClient};
use dynamic_rate_model::{DynamicRateModel, DynamicRateModelClient};
use interest_rate_model::{InterestRateModel, InterestRateModelClient as StaticRateModelClient};
use lending_core::constants::{SECONDS_PER_YEAR, SEED_AMOUNT, WAD};
use lending_core::rate_curve::{AdjustmentConfig, CurveConfig};
use lending_core::LendingError;
use mock_market_manager::{MockMarketManager, MockMarketManagerClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{contract, contractimpl, token, Address, Bytes, Env, String, Symbol};

const START: u64 = 1_000;
const LEND: u128 = 1_000_000_000_000;
const BORROW: u128 = 500_000_000_000;
/// 100% APR at full utilization.
const BASE_RATE: u128 = WAD / SECONDS_PER_YEAR;

#[contract]
pub struct Folding;

#[contractimpl]
impl Folding {
    pub fn on_borrow(_env: Env, _market: Address, _account: Address, _amount: u128, _params: Bytes) {}

    pub fn on_redeem(_env: Env, _market: Address, _account: Address, _amount: u128, _params: Bytes) {}
}

/// Tries to borrow again from the market that is calling it back.
#[contract]
pub struct Reborrower;

#[contractimpl]
impl Reborrower {
    pub fn on_borrow(env: Env, market: Address, account: Address, amount: u128, _params: Bytes) {
        DebtTokenClient::new(&env, &market).borrow(&account, &amount);
    }
}

/// Collateral market that never accrues.
#[contract]
pub struct StaleCollateral;

#[contractimpl]
impl StaleCollateral {
    pub fn accrual_timestamp(_env: Env) -> u64 {
        0
    }

    pub fn balance(_env: Env, _id: Address) -> i128 {
        i128::MAX
    }
}

struct Setup<'a> {
    env: Env,
    admin: Address,
    lender: Address,
    borrower: Address,
    liquidator: Address,
    fee_recipient: Address,
    underlying: token::Client<'a>,
    manager: MockMarketManagerClient<'a>,
    rate_model: Address,
    market: DebtTokenClient<'a>,
}

impl Setup<'_> {
    fn warp(&self, timestamp: u64) {
        self.env.ledger().set_timestamp(timestamp);
    }

    fn collateral_market(&self) -> CollateralTokenClient<'_> {
        let id = self.env.register(CollateralToken, ());
        let collateral = CollateralTokenClient::new(&self.env, &id);
        collateral.initialize(
            &self.admin,
            &self.underlying.address,
            &self.manager.address,
            &self.fee_recipient,
            &String::from_str(&self.env, "Collateral USD"),
            &String::from_str(&self.env, "cUSD"),
        );
        collateral.start_market(&self.admin);
        collateral
    }
}

fn static_model(env: &Env, admin: &Address, base_rate: u128) -> Address {
    let id = env.register(InterestRateModel, ());
    StaticRateModelClient::new(env, &id).initialize(admin, &base_rate, &(3 * BASE_RATE), &(WAD * 8 / 10));
    id
}

fn create_market<'a>(env: &Env, admin: &Address, underlying: &Address, manager: &Address, rate_model: &Address, fee_recipient: &Address) -> DebtTokenClient<'a> {
    let id = env.register(DebtToken, ());
    let market = DebtTokenClient::new(env, &id);
    market.initialize(
        admin,
        underlying,
        manager,
        rate_model,
        &(WAD / 10),
        fee_recipient,
        &String::from_str(env, "Debt USD"),
        &String::from_str(env, "dUSD"),
    );
    market
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let admin = Address::generate(&env);
    let lender = Address::generate(&env);
    let borrower = Address::generate(&env);
    let liquidator = Address::generate(&env);
    let fee_recipient = Address::generate(&env);

    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    let underlying = token::Client::new(&env, &sac.address());
    let underlying_admin = token::StellarAssetClient::new(&env, &sac.address());
    underlying_admin.mint(&admin, &1_000_000);
    underlying_admin.mint(&lender, &(2 * LEND as i128));
    underlying_admin.mint(&borrower, &1_000_000_000);
    underlying_admin.mint(&liquidator, &1_000_000_000);

    let manager_id = env.register(MockMarketManager, ());
    let manager = MockMarketManagerClient::new(&env, &manager_id);
    let rate_model = static_model(&env, &admin, BASE_RATE);
    let market = create_market(&env, &admin, &sac.address(), &manager_id, &rate_model, &fee_recipient);
    market.start_market(&admin);
    market.mint(&lender, &LEND);

    Setup {
        env,
        admin,
        lender,
        borrower,
        liquidator,
        fee_recipient,
        underlying,
        manager,
        rate_model,
        market,
    }
}

#[test]
fn start_market_seeds_cash_and_shares() {
    let s = setup();
    assert!(s.market.is_started());
    assert_eq!(s.market.balance(&s.market.address), SEED_AMOUNT as i128);
    assert_eq!(s.market.balance(&s.lender), LEND as i128);
    assert_eq!(s.market.cash(), LEND + SEED_AMOUNT);
    assert_eq!(s.market.exchange_rate(), WAD);
    assert_eq!(
        s.market.try_start_market(&s.admin),
        Err(Ok(LendingError::MarketAlreadyStarted))
    );
}

#[test]
fn lending_waits_for_start_market() {
    let s = setup();
    let fresh = create_market(
        &s.env,
        &s.admin,
        &s.underlying.address,
        &s.manager.address,
        &s.rate_model,
        &s.fee_recipient,
    );
    assert_eq!(
        fresh.try_mint(&s.lender, &1_000u128),
        Err(Ok(LendingError::MarketNotStarted))
    );
    assert_eq!(
        fresh.try_borrow(&s.borrower, &1_000u128),
        Err(Ok(LendingError::MarketNotStarted))
    );
}

#[test]
fn interest_accrues_over_six_hundred_seconds() {
    let s = setup();
    s.market.borrow(&s.borrower, &BORROW);
    let rate = s.market.borrow_rate();
    assert!(rate > 0);

    s.warp(START + 600);
    s.market.accrue_interest();

    let factor = rate * 600;
    let interest = factor * BORROW / WAD;
    let state = s.market.market_state();
    assert!(interest > 0);
    assert_eq!(state.total_borrows, BORROW + interest);
    assert_eq!(state.borrow_index, WAD + factor);
    assert_eq!(state.total_reserves, interest / 10);
    assert_eq!(state.accrual_timestamp, START + 600);
    assert_eq!(s.market.debt_balance(&s.borrower), BORROW + interest);
}

#[test]
fn accrual_is_idempotent_and_monotonic() {
    let s = setup();
    s.market.borrow(&s.borrower, &BORROW);
    let mut last_index = s.market.borrow_index();
    for step in 1..=4u64 {
        s.warp(START + step * 3_600);
        let first = s.market.accrue_interest();
        let second = s.market.accrue_interest();
        assert_eq!(first, second);
        assert!(first.borrow_index > last_index);
        assert_eq!(first.accrual_timestamp, START + step * 3_600);
        last_index = first.borrow_index;
    }
}

#[test]
fn cached_views_lag_until_accrual() {
    let s = setup();
    s.market.borrow(&s.borrower, &BORROW);
    s.warp(START + 3_600);
    let projected = s.market.debt_balance(&s.borrower);
    assert_eq!(s.market.debt_balance_cached(&s.borrower), BORROW);
    assert!(projected > BORROW);
    assert!(s.market.exchange_rate() > s.market.exchange_rate_cached());

    s.market.accrue_interest();
    assert_eq!(s.market.debt_balance_cached(&s.borrower), projected);
}

#[test]
fn repay_zero_clears_the_whole_debt() {
    let s = setup();
    s.market.borrow(&s.borrower, &BORROW);
    s.warp(START + 600);
    let owed = s.market.debt_balance(&s.borrower);
    let before = s.underlying.balance(&s.borrower);

    let repaid = s.market.repay(&s.borrower, &0u128);
    assert_eq!(repaid, owed);
    assert_eq!(s.underlying.balance(&s.borrower), before - owed as i128);
    assert_eq!(s.market.debt_balance(&s.borrower), 0);
    assert_eq!(s.market.total_borrows(), 0);
}

#[test]
fn repay_is_bounded_by_the_debt() {
    let s = setup();
    assert_eq!(
        s.market.try_repay(&s.borrower, &0u128),
        Err(Ok(LendingError::AmountZero))
    );
    s.market.borrow(&s.borrower, &1_000u128);
    assert_eq!(
        s.market.try_repay(&s.borrower, &1_001u128),
        Err(Ok(LendingError::ExcessiveValue))
    );
    let payer = s.lender.clone();
    s.market.repay_for(&payer, &s.borrower, &400u128);
    assert_eq!(s.market.debt_balance(&s.borrower), 600);
}

#[test]
fn borrow_is_bounded_by_cash() {
    let s = setup();
    let cash = s.market.cash();
    assert_eq!(
        s.market.try_borrow(&s.borrower, &(cash + 1)),
        Err(Ok(LendingError::CashNotAvailable))
    );
    assert_eq!(
        s.market.try_borrow(&s.borrower, &0u128),
        Err(Ok(LendingError::AmountZero))
    );
    s.manager.set_deny(&Symbol::new(&s.env, "can_borrow"), &true);
    assert_eq!(
        s.market.try_borrow(&s.borrower, &1_000u128),
        Err(Ok(LendingError::AdmissionDenied))
    );
}

#[test]
fn lenders_earn_the_interest() {
    let s = setup();
    s.market.borrow(&s.borrower, &BORROW);
    s.warp(START + 30 * 86_400);
    s.market.accrue_interest();
    assert!(s.market.exchange_rate() > WAD);

    let received = s.market.redeem(&s.lender, &1_000_000u128);
    assert!(received > 1_000_000);
    let burned = s.market.redeem_underlying(&s.lender, &1_000_000u128);
    assert!(burned < 1_000_000);
    assert_eq!(
        s.market.try_redeem(&s.lender, &(2 * LEND)),
        Err(Ok(LendingError::InsufficientShares))
    );
}

#[test]
fn liquidation_seizes_collateral_with_a_protocol_cut() {
    let s = setup();
    let collateral = s.collateral_market();
    collateral.deposit(&s.borrower, &1_000u128, &s.borrower);
    s.market.borrow(&s.borrower, &500u128);
    s.manager.set_liquidation(&550u128, &55u128);
    let cash_before = s.underlying.balance(&s.liquidator);

    let outcome = s
        .market
        .liquidate(&s.liquidator, &s.borrower, &100u128, &collateral.address);
    assert_eq!(
        outcome,
        LiquidationOutcome {
            repaid: 100,
            liquidated_shares: 550,
            protocol_shares: 55,
        }
    );
    assert_eq!(s.underlying.balance(&s.liquidator), cash_before - 100);
    assert_eq!(s.market.debt_balance(&s.borrower), 400);
    assert_eq!(collateral.balance(&s.borrower), 450);
    assert_eq!(collateral.balance(&s.liquidator), 495);
    assert_eq!(collateral.balance(&s.fee_recipient), 55);
}

#[test]
fn liquidation_rejects_bad_requests() {
    let s = setup();
    let collateral = s.collateral_market();
    collateral.deposit(&s.borrower, &1_000u128, &s.borrower);
    s.market.borrow(&s.borrower, &500u128);
    s.manager.set_liquidation(&2_000u128, &0u128);

    assert_eq!(
        s.market
            .try_liquidate(&s.borrower, &s.borrower, &100u128, &collateral.address),
        Err(Ok(LendingError::SelfLiquidationNotAllowed))
    );
    assert_eq!(
        s.market
            .try_liquidate(&s.liquidator, &s.borrower, &0u128, &collateral.address),
        Err(Ok(LendingError::AmountZero))
    );
    // more shares than the borrower holds
    assert_eq!(
        s.market
            .try_liquidate(&s.liquidator, &s.borrower, &100u128, &collateral.address),
        Err(Ok(LendingError::ExcessiveValue))
    );
    s.manager.set_listed(&collateral.address, &false);
    assert_eq!(
        s.market
            .try_liquidate(&s.liquidator, &s.borrower, &100u128, &collateral.address),
        Err(Ok(LendingError::Unauthorized))
    );
    assert_eq!(s.market.debt_balance(&s.borrower), 500);
}

#[test]
fn liquidation_needs_a_fresh_collateral_market() {
    let s = setup();
    let stale = s.env.register(StaleCollateral, ());
    s.market.borrow(&s.borrower, &500u128);
    s.manager.set_liquidation(&100u128, &0u128);
    assert_eq!(
        s.market.try_liquidate(&s.liquidator, &s.borrower, &100u128, &stale),
        Err(Ok(LendingError::StaleAccrual))
    );
}

#[test]
fn liquidation_can_seize_the_markets_own_shares() {
    let s = setup();
    s.market.mint(&s.borrower, &1_000u128);
    s.market.borrow(&s.borrower, &500u128);
    s.manager.set_liquidation(&550u128, &55u128);

    s.market
        .liquidate(&s.liquidator, &s.borrower, &100u128, &s.market.address);
    assert_eq!(s.market.balance(&s.borrower), 450);
    assert_eq!(s.market.balance(&s.liquidator), 495);
    assert_eq!(s.market.balance(&s.fee_recipient), 55);
    assert_eq!(s.market.debt_balance(&s.borrower), 400);
}

#[test]
fn other_markets_can_seize_debt_token_shares() {
    let s = setup();
    let debt_market = Address::generate(&s.env);
    s.market
        .seize(&debt_market, &s.liquidator, &s.lender, &1_000u128, &100u128);
    assert_eq!(s.market.balance(&s.liquidator), 900);
    assert_eq!(s.market.balance(&s.fee_recipient), 100);
    assert_eq!(s.market.balance(&s.lender), (LEND - 1_000) as i128);

    s.manager.set_listed(&debt_market, &false);
    assert_eq!(
        s.market
            .try_seize(&debt_market, &s.liquidator, &s.lender, &1_000u128, &0u128),
        Err(Ok(LendingError::Unauthorized))
    );
}

#[test]
fn position_folding_borrow_is_restricted() {
    let s = setup();
    let folding = s.env.register(Folding, ());
    let params = Bytes::new(&s.env);
    assert_eq!(
        s.market
            .try_borrow_for_position_folding(&folding, &s.borrower, &1_000u128, &params),
        Err(Ok(LendingError::Unauthorized))
    );

    s.manager.set_position_folding(&folding);
    s.market
        .borrow_for_position_folding(&folding, &s.borrower, &1_000u128, &params);
    assert_eq!(s.underlying.balance(&folding), 1_000);
    assert_eq!(s.market.debt_balance(&s.borrower), 1_000);
}

#[test]
fn reserves_can_be_withdrawn_by_the_admin() {
    let s = setup();
    assert_eq!(
        s.market.try_set_reserve_factor(&(WAD / 2 + 1)),
        Err(Ok(LendingError::InvalidReserveFactor))
    );
    s.market.borrow(&s.borrower, &BORROW);
    s.warp(START + 86_400);
    s.market.accrue_interest();
    let reserves = s.market.total_reserves();
    assert!(reserves > 0);
    assert_eq!(
        s.market.try_withdraw_reserves(&s.admin, &(reserves + 1)),
        Err(Ok(LendingError::InsufficientReserves))
    );

    let before = s.underlying.balance(&s.admin);
    s.market.withdraw_reserves(&s.admin, &reserves);
    assert_eq!(s.market.total_reserves(), 0);
    assert_eq!(s.underlying.balance(&s.admin), before + reserves as i128);
}

#[test]
fn rate_model_swap_accrues_under_the_old_model() {
    let s = setup();
    let not_a_model = Address::generate(&s.env);
    assert_eq!(
        s.market.try_set_interest_rate_model(&not_a_model),
        Err(Ok(LendingError::InvalidRateModel))
    );

    s.market.borrow(&s.borrower, &BORROW);
    s.warp(START + 600);
    let flat = static_model(&s.env, &s.admin, 0);
    s.market.set_interest_rate_model(&flat);
    assert_eq!(s.market.interest_rate_model(), flat);
    assert_eq!(s.market.accrual_timestamp(), START + 600);
    let index = s.market.borrow_index();
    assert!(index > WAD);

    s.warp(START + 1_200);
    s.market.accrue_interest();
    assert_eq!(s.market.borrow_index(), index);
}

#[test]
fn share_transfers_are_gated_by_the_manager() {
    let s = setup();
    let other = Address::generate(&s.env);
    s.market.transfer(&s.lender, &other, &1_000u128);
    assert_eq!(s.market.balance(&other), 1_000);

    s.manager.set_deny(&Symbol::new(&s.env, "can_transfer"), &true);
    assert_eq!(
        s.market.try_transfer(&s.lender, &other, &1_000u128),
        Err(Ok(LendingError::AdmissionDenied))
    );
}

#[test]
fn dynamic_model_updates_through_accrual() {
    let s = setup();
    let curve = CurveConfig {
        base_rate: BASE_RATE,
        vertex_rate: 3 * BASE_RATE,
        vertex_start: WAD * 8 / 10,
    };
    let adjustment = AdjustmentConfig {
        adjustment_rate: 4 * 3_600,
        adjustment_velocity: WAD,
        decay_rate: WAD / 100,
        vertex_multiplier_max: 10 * WAD,
        increase_threshold_start: WAD * 85 / 100,
        decrease_threshold_end: WAD * 60 / 100,
    };
    let model_id = s.env.register(DynamicRateModel, ());
    let model = DynamicRateModelClient::new(&s.env, &model_id);
    model.initialize(&s.admin, &curve, &adjustment);
    model.link_market(&s.market.address);

    s.market.set_interest_rate_model(&model_id);
    s.market.borrow(&s.borrower, &BORROW);

    s.warp(START + 4 * 3_600);
    s.market.accrue_interest();
    assert_eq!(
        model.rate_state().next_update_timestamp,
        START + 8 * 3_600
    );
    assert!(s.market.borrow_index() > WAD);
}

#[test]
fn folding_callback_cannot_reenter_the_market() {
    let s = setup();
    let folding = s.env.register(Reborrower, ());
    s.manager.set_position_folding(&folding);
    let cash = s.market.cash();

    let params = Bytes::new(&s.env);
    assert!(s
        .market
        .try_borrow_for_position_folding(&folding, &s.borrower, &1_000u128, &params)
        .is_err());
    assert_eq!(s.underlying.balance(&folding), 0);
    assert_eq!(s.market.debt_balance(&s.borrower), 0);
    assert_eq!(s.market.cash(), cash);
}

#[test]
fn accrual_rejects_a_rate_above_the_ceiling() {
    let s = setup();
    // five times the ceiling at half utilization
    let hot = static_model(&s.env, &s.admin, 100 * BASE_RATE);
    s.market.set_interest_rate_model(&hot);
    s.market.borrow(&s.borrower, &BORROW);
    let state = s.market.market_state();

    s.warp(START + 600);
    assert_eq!(
        s.market.try_accrue_interest(),
        Err(Ok(LendingError::BorrowRateTooHigh))
    );
    assert_eq!(s.market.market_state(), state);
    assert_eq!(
        s.market.try_borrow(&s.borrower, &1_000u128),
        Err(Ok(LendingError::BorrowRateTooHigh))
    );
}
