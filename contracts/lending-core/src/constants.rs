/// Fixed point scale used for rates, indexes and ratios.
pub const WAD: u128 = 1_000_000_000_000_000_000u128; // 1e18

pub const SECONDS_PER_YEAR: u128 = 31_536_000;

/// Units deposited by `start_market`; the shares are locked in the market.
pub const SEED_AMOUNT: u128 = 42_069;

/// 1000% APR expressed per second.
pub const MAX_BORROW_RATE_PER_SECOND: u128 = 10 * WAD / SECONDS_PER_YEAR;

pub const MAX_RESERVE_FACTOR: u128 = WAD / 2;
pub const MAX_HARVEST_FEE: u128 = WAD / 2;
pub const MAX_EXIT_FEE: u128 = WAD / 50; // 2%

pub const MIN_VEST_PERIOD: u64 = 60;
pub const MAX_VEST_PERIOD: u64 = 7 * 24 * 60 * 60;

// dynamic rate model bounds
pub const MIN_ADJUSTMENT_RATE: u64 = 60 * 60;
pub const MAX_ADJUSTMENT_RATE: u64 = 12 * 60 * 60;
pub const MIN_ADJUSTMENT_VELOCITY: u128 = WAD / 2;
pub const MAX_ADJUSTMENT_VELOCITY: u128 = 2 * WAD;
pub const MAX_DECAY_RATE: u128 = WAD / 20; // 5%

pub const TTL_THRESHOLD: u32 = 100_000;
pub const TTL_EXTEND_TO: u32 = 200_000;

pub const SHARE_DECIMALS: u32 = 7;
