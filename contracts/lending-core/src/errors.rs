use soroban_sdk::contracterror;

/// Error codes shared by every market, rate model and vault contract.
///
/// Codes are stable: off-chain tooling matches on the numeric value.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LendingError {
    // configuration
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidConfiguration = 3,
    InvalidRateModel = 4,
    InvalidExitFee = 5,
    InvalidReserveFactor = 6,
    InvalidHarvestFee = 7,

    // authorization
    Unauthorized = 10,
    Reentrancy = 11,

    // admission
    AdmissionDenied = 20,
    ExternalCallFailed = 21,

    // invariants
    AmountZero = 30,
    ZeroShares = 31,
    ZeroAssets = 32,
    CashNotAvailable = 33,
    InsufficientShares = 34,
    InsufficientReserves = 35,
    InsufficientAllowance = 36,
    ExcessiveValue = 37,
    SelfLiquidationNotAllowed = 38,
    StaleAccrual = 39,
    BorrowRateTooHigh = 40,
    MarketNotStarted = 41,
    MarketAlreadyStarted = 42,
    CompoundingPaused = 43,
    MathOverflow = 44,
    SelfTransferNotAllowed = 45,
}
