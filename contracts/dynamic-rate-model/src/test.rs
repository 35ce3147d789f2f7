use super::*;
use lending_core::constants::WAD;
use soroban_sdk::testutils::{Address as _, Ledger};

const HOUR: u64 = 3_600;

fn curve() -> CurveConfig {
    CurveConfig {
        base_rate: 1_000_000_000,
        vertex_rate: 10_000_000_000,
        vertex_start: WAD * 8 / 10,
    }
}

fn adjustment() -> AdjustmentConfig {
    AdjustmentConfig {
        adjustment_rate: 4 * HOUR,
        adjustment_velocity: WAD,
        decay_rate: WAD / 100,
        vertex_multiplier_max: 10 * WAD,
        increase_threshold_start: WAD * 85 / 100,
        decrease_threshold_end: WAD * 60 / 100,
    }
}

struct Setup<'a> {
    env: Env,
    market: Address,
    client: DynamicRateModelClient<'a>,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);
    let admin = Address::generate(&env);
    let market = Address::generate(&env);
    let id = env.register(DynamicRateModel, ());
    let client = DynamicRateModelClient::new(&env, &id);
    client.initialize(&admin, &curve(), &adjustment());
    client.link_market(&market);
    Setup { env, market, client }
}

#[test]
fn multiplier_waits_for_the_window() {
    let s = setup();
    assert_eq!(s.client.vertex_multiplier(), WAD);
    // fully utilized, but the first window has not ended
    s.client.get_borrow_rate_with_update(&0u128, &1_000u128, &0u128);
    assert_eq!(s.client.vertex_multiplier(), WAD);

    s.env.ledger().set_timestamp(1_000 + 4 * HOUR);
    s.client.get_borrow_rate_with_update(&0u128, &1_000u128, &0u128);
    assert_eq!(s.client.vertex_multiplier(), 2 * WAD - 2 * WAD / 100);
    assert_eq!(
        s.client.rate_state().next_update_timestamp,
        1_000 + 8 * HOUR
    );

    // a second query inside the new window leaves it alone
    s.env.ledger().set_timestamp(1_000 + 5 * HOUR);
    s.client.get_borrow_rate_with_update(&0u128, &1_000u128, &0u128);
    assert_eq!(s.client.vertex_multiplier(), 2 * WAD - 2 * WAD / 100);
}

#[test]
fn multiplier_scales_the_vertex_slope() {
    let s = setup();
    let before = s.client.get_borrow_rate(&100u128, &900u128, &0u128);
    s.env.ledger().set_timestamp(1_000 + 4 * HOUR);
    let after = s.client.get_borrow_rate_with_update(&100u128, &900u128, &0u128);
    assert!(after > before);
    // the update is applied to the rate it returns
    assert_eq!(after, s.client.get_borrow_rate(&100u128, &900u128, &0u128));
}

#[test]
fn low_utilization_decays_back_to_one() {
    let s = setup();
    s.env.ledger().set_timestamp(1_000 + 4 * HOUR);
    s.client.get_borrow_rate_with_update(&0u128, &1_000u128, &0u128);
    assert!(s.client.vertex_multiplier() > WAD);
    for step in 2..6u64 {
        s.env.ledger().set_timestamp(1_000 + step * 4 * HOUR);
        s.client.get_borrow_rate_with_update(&1_000u128, &0u128, &0u128);
    }
    assert_eq!(s.client.vertex_multiplier(), WAD);
}

#[test]
fn only_the_linked_market_updates() {
    let s = setup();
    assert_eq!(s.client.linked_market(), Some(s.market.clone()));

    let env = Env::default();
    env.mock_all_auths();
    let id = env.register(DynamicRateModel, ());
    let unlinked = DynamicRateModelClient::new(&env, &id);
    unlinked.initialize(&Address::generate(&env), &curve(), &adjustment());
    assert_eq!(
        unlinked.try_get_borrow_rate_with_update(&0u128, &1_000u128, &0u128),
        Err(Ok(LendingError::Unauthorized))
    );
}

#[test]
fn configuration_is_validated() {
    let s = setup();
    let mut bad = adjustment();
    bad.adjustment_rate = 13 * HOUR;
    assert_eq!(
        s.client.try_update_configuration(&curve(), &bad),
        Err(Ok(LendingError::InvalidConfiguration))
    );

    let mut bad = adjustment();
    bad.decay_rate = WAD / 10;
    assert_eq!(
        s.client.try_update_configuration(&curve(), &bad),
        Err(Ok(LendingError::InvalidConfiguration))
    );

    let mut narrow = adjustment();
    narrow.vertex_multiplier_max = WAD;
    s.env.ledger().set_timestamp(1_000 + 4 * HOUR);
    s.client.get_borrow_rate_with_update(&0u128, &1_000u128, &0u128);
    s.client.update_configuration(&curve(), &narrow);
    assert_eq!(s.client.vertex_multiplier(), WAD);
}

#[test]
fn just_under_the_decrease_band_halves_the_multiplier() {
    let s = setup();
    for step in 1..3u64 {
        s.env.ledger().set_timestamp(1_000 + step * 4 * HOUR);
        s.client.get_borrow_rate_with_update(&0u128, &1_000u128, &0u128);
    }
    let high = s.client.vertex_multiplier();
    assert_eq!(high, 3_920_400_000_000_000_000);

    // 59% utilization sits one point inside the band
    s.env.ledger().set_timestamp(1_000 + 12 * HOUR);
    s.client.get_borrow_rate_with_update(&410u128, &590u128, &0u128);
    let half = high / 2;
    assert_eq!(s.client.vertex_multiplier(), half - half / 100);
}
