//! Linear release of harvested yield.
//!
//! A harvest opens a window `[now, now + vest_period]` and streams its yield
//! at a constant `reward_rate`. Pending rewards are derived from timestamps on
//! every call and are never cached.

use soroban_sdk::contracttype;

use crate::constants::{MAX_VEST_PERIOD, MIN_VEST_PERIOD, WAD};
use crate::errors::LendingError;
use crate::math::mul_div_down;

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VestingState {
    /// WAD scaled assets released per second.
    pub reward_rate: u128,
    pub vesting_period_end: u64,
    pub last_vest_claim: u64,
}

/// Vest period length plus a change staged for the next harvest.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestConfig {
    pub vest_period: u64,
    pub update_needed: bool,
    pub new_vest_period: u64,
}

impl VestingState {
    /// Yield earned since the last claim, as of `now`.
    pub fn pending(&self, now: u64) -> Result<u128, LendingError> {
        if self.last_vest_claim >= self.vesting_period_end {
            return Ok(0);
        }
        let until = now.min(self.vesting_period_end);
        if until <= self.last_vest_claim {
            return Ok(0);
        }
        let elapsed = (until - self.last_vest_claim) as u128;
        mul_div_down(self.reward_rate, elapsed, WAD)
    }

    /// True once the open window (if any) has fully elapsed.
    pub fn window_elapsed(&self, now: u64) -> bool {
        now >= self.vesting_period_end
    }

    pub fn is_vesting(&self) -> bool {
        self.last_vest_claim < self.vesting_period_end
    }

    /// Advances the claim cursor and returns what was released.
    pub fn claim(&mut self, now: u64) -> Result<u128, LendingError> {
        let released = self.pending(now)?;
        if self.is_vesting() {
            self.last_vest_claim = now.min(self.vesting_period_end).max(self.last_vest_claim);
        }
        Ok(released)
    }

    /// Opens a new window streaming `rewards` over `vest_period` seconds.
    pub fn start(&mut self, rewards: u128, now: u64, vest_period: u64) -> Result<(), LendingError> {
        if vest_period == 0 {
            return Err(LendingError::InvalidConfiguration);
        }
        self.reward_rate = mul_div_down(rewards, WAD, vest_period as u128)?;
        self.vesting_period_end = now
            .checked_add(vest_period)
            .ok_or(LendingError::MathOverflow)?;
        self.last_vest_claim = now;
        Ok(())
    }
}

impl VestConfig {
    pub fn new(vest_period: u64) -> Result<Self, LendingError> {
        validate_vest_period(vest_period)?;
        Ok(Self {
            vest_period,
            update_needed: false,
            new_vest_period: 0,
        })
    }

    pub fn stage(&mut self, new_vest_period: u64) -> Result<(), LendingError> {
        validate_vest_period(new_vest_period)?;
        self.update_needed = true;
        self.new_vest_period = new_vest_period;
        Ok(())
    }

    /// Applies a staged period. Only called between windows.
    pub fn apply_staged(&mut self) -> bool {
        if !self.update_needed {
            return false;
        }
        self.vest_period = self.new_vest_period;
        self.update_needed = false;
        self.new_vest_period = 0;
        true
    }
}

fn validate_vest_period(vest_period: u64) -> Result<(), LendingError> {
    if !(MIN_VEST_PERIOD..=MAX_VEST_PERIOD).contains(&vest_period) {
        return Err(LendingError::InvalidConfiguration);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const DAY: u64 = 86_400;

    #[test]
    fn pending_is_linear_inside_the_window() {
        let mut state = VestingState::default();
        state.start(86_400_000, 1_000, DAY).unwrap();
        assert_eq!(state.reward_rate, 1_000 * WAD);
        assert_eq!(state.pending(1_000).unwrap(), 0);
        assert_eq!(state.pending(1_000 + 10).unwrap(), 10_000);
        assert_eq!(state.pending(1_000 + DAY / 2).unwrap(), 43_200_000);
    }

    #[test]
    fn pending_stops_at_window_end() {
        let mut state = VestingState::default();
        state.start(86_400_000, 0, DAY).unwrap();
        assert_eq!(state.pending(DAY).unwrap(), 86_400_000);
        assert_eq!(state.pending(DAY * 5).unwrap(), 86_400_000);
    }

    #[test]
    fn claims_advance_the_cursor() {
        let mut state = VestingState::default();
        state.start(86_400_000, 0, DAY).unwrap();
        assert_eq!(state.claim(DAY / 4).unwrap(), 21_600_000);
        assert_eq!(state.last_vest_claim, DAY / 4);
        assert_eq!(state.pending(DAY / 4).unwrap(), 0);
        assert_eq!(state.claim(DAY * 2).unwrap(), 64_800_000);
        assert_eq!(state.last_vest_claim, DAY);
        assert!(!state.is_vesting());
        assert_eq!(state.claim(DAY * 3).unwrap(), 0);
    }

    #[test]
    fn idle_state_has_nothing_pending() {
        let state = VestingState::default();
        assert_eq!(state.pending(12_345).unwrap(), 0);
        assert!(state.window_elapsed(0));
    }

    #[test]
    fn staged_period_applies_once() {
        let mut config = VestConfig::new(DAY).unwrap();
        assert!(!config.apply_staged());
        config.stage(DAY / 2).unwrap();
        assert_eq!(config.vest_period, DAY);
        assert!(config.apply_staged());
        assert_eq!(config.vest_period, DAY / 2);
        assert!(!config.update_needed);
        assert_eq!(config.stage(1), Err(LendingError::InvalidConfiguration));
    }
}
