use soroban_sdk::{contractevent, Address, Symbol};

/// A call to a collaborator failed and the invocation is being aborted.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExternalCallFailed {
    #[topic]
    pub contract: Address,
    pub function: Symbol,
    pub failure_kind: u32,
}

/// ERC4626 Deposit.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    #[topic]
    pub caller: Address,
    #[topic]
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
}

/// ERC4626 Withdraw. `assets` is the amount paid out after any exit fee.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    #[topic]
    pub caller: Address,
    #[topic]
    pub receiver: Address,
    #[topic]
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketStarted {
    #[topic]
    pub initializer: Address,
    pub assets: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharesSeized {
    #[topic]
    pub liquidator: Address,
    #[topic]
    pub account: Address,
    pub liquidated_shares: u128,
    pub protocol_shares: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Harvest {
    #[topic]
    pub harvester: Address,
    pub yield_amount: u128,
    pub protocol_fee: u128,
    pub vesting_period_end: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestPeriodStaged {
    pub new_vest_period: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompoundingPaused {
    pub paused: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitFeeUpdated {
    pub exit_fee: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewAdmin {
    #[topic]
    pub admin: Address,
}
