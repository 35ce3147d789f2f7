#![cfg(test)]

use crate::{CollateralToken, CollateralTokenClient};
use lending_core::constants::{SEED_AMOUNT, SHARE_DECIMALS, WAD};
use lending_core::LendingError;
use mock_market_manager::{MockMarketManager, MockMarketManagerClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{contract, contractimpl, token, Address, Bytes, Env, String, Symbol};

#[contract]
pub struct Folding;

#[contractimpl]
impl Folding {
    pub fn on_borrow(_env: Env, _market: Address, _account: Address, _amount: u128, _params: Bytes) {}

    pub fn on_redeem(_env: Env, _market: Address, _account: Address, _amount: u128, _params: Bytes) {}
}

/// Hands the redeemed assets straight back to the market from the callback.
#[contract]
pub struct Redepositor;

#[contractimpl]
impl Redepositor {
    pub fn on_redeem(env: Env, market: Address, account: Address, amount: u128, _params: Bytes) {
        let me = env.current_contract_address();
        CollateralTokenClient::new(&env, &market).deposit(&me, &amount, &account);
    }
}

struct Setup<'a> {
    env: Env,
    admin: Address,
    user: Address,
    fee_recipient: Address,
    asset: token::Client<'a>,
    manager: MockMarketManagerClient<'a>,
    vault: CollateralTokenClient<'a>,
}

fn create_vault<'a>(env: &Env, admin: &Address, asset: &Address, manager: &Address, fee_recipient: &Address) -> CollateralTokenClient<'a> {
    let id = env.register(CollateralToken, ());
    let vault = CollateralTokenClient::new(env, &id);
    vault.initialize(
        admin,
        asset,
        manager,
        fee_recipient,
        &String::from_str(env, "Collateral USD"),
        &String::from_str(env, "cUSD"),
    );
    vault
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);

    let admin = Address::generate(&env);
    let user = Address::generate(&env);
    let fee_recipient = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    let asset = token::Client::new(&env, &sac.address());
    let asset_admin = token::StellarAssetClient::new(&env, &sac.address());
    asset_admin.mint(&admin, &1_000_000);
    asset_admin.mint(&user, &10_000);

    let manager_id = env.register(MockMarketManager, ());
    let manager = MockMarketManagerClient::new(&env, &manager_id);
    let vault = create_vault(&env, &admin, &sac.address(), &manager_id, &fee_recipient);
    vault.start_market(&admin);

    Setup {
        env,
        admin,
        user,
        fee_recipient,
        asset,
        manager,
        vault,
    }
}

#[test]
fn start_market_seeds_the_vault() {
    let s = setup();
    assert!(s.vault.is_started());
    assert_eq!(s.vault.balance(&s.vault.address), SEED_AMOUNT as i128);
    assert_eq!(s.vault.total_assets(), SEED_AMOUNT);
    assert_eq!(s.vault.exchange_rate(), WAD);
    assert_eq!(
        s.vault.try_start_market(&s.admin),
        Err(Ok(LendingError::MarketAlreadyStarted))
    );
}

#[test]
fn deposits_wait_for_start_market() {
    let s = setup();
    let fresh = create_vault(
        &s.env,
        &s.admin,
        &s.asset.address,
        &s.manager.address,
        &s.fee_recipient,
    );
    assert_eq!(fresh.max_deposit(), 0);
    assert_eq!(
        fresh.try_deposit(&s.user, &100u128, &s.user),
        Err(Ok(LendingError::MarketNotStarted))
    );
}

#[test]
fn deposit_then_redeem_returns_no_more_than_supplied() {
    let s = setup();
    let shares = s.vault.deposit(&s.user, &1_000u128, &s.user);
    assert_eq!(shares, 1_000);
    assert_eq!(s.vault.balance(&s.user), 1_000);
    assert_eq!(s.vault.total_assets(), SEED_AMOUNT + 1_000);
    assert_eq!(s.asset.balance(&s.user), 9_000);

    let assets = s.vault.redeem(&s.user, &shares, &s.user, &s.user);
    assert!(assets <= 1_000);
    assert_eq!(s.asset.balance(&s.user), 9_000 + assets as i128);
    assert_eq!(s.vault.balance(&s.user), 0);
    assert_eq!(s.vault.total_assets(), SEED_AMOUNT + 1_000 - assets);
}

#[test]
fn shares_are_conserved_across_operations() {
    let s = setup();
    let other = Address::generate(&s.env);
    s.vault.deposit(&s.user, &2_000u128, &s.user);
    s.vault.mint(&s.user, &500u128, &other);
    s.vault.transfer(&s.user, &other, &300u128);
    s.vault.withdraw(&s.user, &200u128, &s.user, &s.user);

    let supply = s.vault.total_supply();
    let sum = s.vault.balance(&s.user) + s.vault.balance(&other) + s.vault.balance(&s.vault.address);
    assert_eq!(supply, sum);
    assert_eq!(s.vault.balance(&s.user), 1_500);
    assert_eq!(s.vault.balance(&other), 800);
}

#[test]
fn donations_do_not_move_the_exchange_rate() {
    let s = setup();
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    let donor = token::StellarAssetClient::new(&s.env, &s.asset.address);
    donor.mint(&s.vault.address, &5_000);

    assert_eq!(s.vault.total_assets(), SEED_AMOUNT + 1_000);
    assert_eq!(s.vault.position_balance(), SEED_AMOUNT + 6_000);
    assert_eq!(s.vault.convert_to_assets(&1_000u128), 1_000);
}

#[test]
fn zero_amounts_are_rejected() {
    let s = setup();
    assert_eq!(
        s.vault.try_deposit(&s.user, &0u128, &s.user),
        Err(Ok(LendingError::AmountZero))
    );
    assert_eq!(
        s.vault.try_redeem(&s.user, &0u128, &s.user, &s.user),
        Err(Ok(LendingError::AmountZero))
    );
}

#[test]
fn redeem_is_bounded_by_the_share_balance() {
    let s = setup();
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    assert_eq!(
        s.vault.try_redeem(&s.user, &1_001u128, &s.user, &s.user),
        Err(Ok(LendingError::InsufficientShares))
    );
}

#[test]
fn manager_veto_aborts_the_deposit() {
    let s = setup();
    s.manager.set_deny(&Symbol::new(&s.env, "can_mint"), &true);
    assert_eq!(
        s.vault.try_deposit(&s.user, &1_000u128, &s.user),
        Err(Ok(LendingError::AdmissionDenied))
    );
    assert_eq!(s.asset.balance(&s.user), 10_000);
    assert_eq!(s.vault.balance(&s.user), 0);
}

#[test]
fn posted_collateral_needs_the_force_flag() {
    let s = setup();
    s.vault.deposit_as_collateral(&s.user, &1_000u128);
    assert_eq!(s.manager.posted_collateral(&s.user, &s.vault.address), 1_000);

    assert_eq!(
        s.vault.try_redeem(&s.user, &400u128, &s.user, &s.user),
        Err(Ok(LendingError::AdmissionDenied))
    );
    s.vault.redeem_collateral(&s.user, &400u128, &s.user, &s.user);
    assert_eq!(s.manager.posted_collateral(&s.user, &s.vault.address), 600);
    assert_eq!(s.vault.balance(&s.user), 600);
}

#[test]
fn transfers_release_posted_collateral() {
    let s = setup();
    let other = Address::generate(&s.env);
    s.vault.deposit_as_collateral(&s.user, &1_000u128);
    s.vault.transfer(&s.user, &other, &300u128);
    assert_eq!(s.manager.posted_collateral(&s.user, &s.vault.address), 700);
    assert_eq!(s.vault.balance(&other), 300);
}

#[test]
fn seize_splits_off_the_protocol_cut() {
    let s = setup();
    let debt_market = Address::generate(&s.env);
    let liquidator = Address::generate(&s.env);
    s.vault.deposit(&s.user, &1_000u128, &s.user);

    s.vault.seize(&debt_market, &liquidator, &s.user, &550u128, &55u128);
    assert_eq!(s.vault.balance(&s.user), 450);
    assert_eq!(s.vault.balance(&liquidator), 495);
    assert_eq!(s.vault.balance(&s.fee_recipient), 55);
    assert_eq!(s.vault.total_assets(), SEED_AMOUNT + 1_000);
}

#[test]
fn seize_rejects_bad_requests() {
    let s = setup();
    let debt_market = Address::generate(&s.env);
    let liquidator = Address::generate(&s.env);
    s.vault.deposit(&s.user, &1_000u128, &s.user);

    assert_eq!(
        s.vault.try_seize(&debt_market, &s.user, &s.user, &100u128, &0u128),
        Err(Ok(LendingError::SelfLiquidationNotAllowed))
    );
    assert_eq!(
        s.vault.try_seize(&debt_market, &liquidator, &s.user, &1_001u128, &0u128),
        Err(Ok(LendingError::ExcessiveValue))
    );
    s.manager.set_listed(&debt_market, &false);
    assert_eq!(
        s.vault.try_seize(&debt_market, &liquidator, &s.user, &100u128, &0u128),
        Err(Ok(LendingError::Unauthorized))
    );
}

#[test]
fn account_liquidation_moves_shares_whole() {
    let s = setup();
    let liquidator = Address::generate(&s.env);
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    s.vault.seize_account_liquidation(&liquidator, &s.user, &1_000u128);
    assert_eq!(s.vault.balance(&s.user), 0);
    assert_eq!(s.vault.balance(&liquidator), 1_000);
    assert_eq!(s.vault.balance(&s.fee_recipient), 0);
}

#[test]
fn gauge_mirrors_share_moves() {
    let s = setup();
    let other = Address::generate(&s.env);
    s.manager.set_gauge_enabled(&true);
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    assert_eq!(s.manager.gauge_balance(&s.vault.address, &s.user), 1_000);

    s.vault.transfer(&s.user, &other, &400u128);
    assert_eq!(s.manager.gauge_balance(&s.vault.address, &s.user), 600);
    assert_eq!(s.manager.gauge_balance(&s.vault.address, &other), 400);

    s.vault.redeem(&other, &400u128, &other, &other);
    assert_eq!(s.manager.gauge_balance(&s.vault.address, &other), 0);
}

#[test]
fn allowance_gates_third_party_redeem() {
    let s = setup();
    let spender = Address::generate(&s.env);
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    assert_eq!(
        s.vault.try_redeem(&spender, &100u128, &spender, &s.user),
        Err(Ok(LendingError::InsufficientAllowance))
    );

    s.vault.approve(&s.user, &spender, &100u128, &1_000u32);
    s.vault.redeem(&spender, &100u128, &spender, &s.user);
    assert_eq!(s.asset.balance(&spender), 100);
    assert_eq!(s.vault.allowance(&s.user, &spender), 0);
}

#[test]
fn position_folding_redeems_to_the_folding_contract() {
    let s = setup();
    let folding = s.env.register(Folding, ());
    let impostor = s.env.register(Folding, ());
    s.manager.set_position_folding(&folding);
    s.vault.deposit(&s.user, &1_000u128, &s.user);

    let params = Bytes::new(&s.env);
    assert_eq!(
        s.vault
            .try_redeem_for_position_folding(&impostor, &s.user, &400u128, &params),
        Err(Ok(LendingError::Unauthorized))
    );
    let paid = s
        .vault
        .redeem_for_position_folding(&folding, &s.user, &400u128, &params);
    assert_eq!(paid, 400);
    assert_eq!(s.asset.balance(&folding), 400);
    assert_eq!(s.vault.balance(&s.user), 600);
}

#[test]
fn primitive_vault_is_always_fresh() {
    let s = setup();
    s.env.ledger().set_timestamp(9_999);
    assert_eq!(s.vault.accrual_timestamp(), 9_999);
    assert_eq!(s.vault.accrue(), 0);
}

#[test]
fn folding_callback_cannot_reenter_the_market() {
    let s = setup();
    let folding = s.env.register(Redepositor, ());
    s.manager.set_position_folding(&folding);
    s.vault.deposit(&s.user, &1_000u128, &s.user);

    let params = Bytes::new(&s.env);
    assert!(s
        .vault
        .try_redeem_for_position_folding(&folding, &s.user, &400u128, &params)
        .is_err());
    // nothing of the aborted redeem survives
    assert_eq!(s.vault.balance(&s.user), 1_000);
    assert_eq!(s.asset.balance(&folding), 0);
    assert_eq!(s.vault.total_assets(), SEED_AMOUNT + 1_000);
}

#[test]
fn self_transfer_is_rejected() {
    let s = setup();
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    assert_eq!(
        s.vault.try_transfer(&s.user, &s.user, &100u128),
        Err(Ok(LendingError::SelfTransferNotAllowed))
    );
    let spender = Address::generate(&s.env);
    s.vault.approve(&s.user, &spender, &100u128, &1_000u32);
    assert_eq!(
        s.vault.try_transfer_from(&spender, &s.user, &s.user, &100u128),
        Err(Ok(LendingError::SelfTransferNotAllowed))
    );
    assert_eq!(s.vault.balance(&s.user), 1_000);
    assert_eq!(s.vault.allowance(&s.user, &spender), 100);
}

#[test]
fn exchange_rate_tracks_total_assets_per_share() {
    let s = setup();
    s.vault.deposit(&s.user, &1_000u128, &s.user);
    assert_eq!(s.vault.exchange_rate(), WAD);
    assert_eq!(s.vault.decimals(), SHARE_DECIMALS);
    assert_eq!(s.vault.symbol(), String::from_str(&s.env, "cUSD"));
}
