//! Two-slope borrow curve shared by the static and dynamic rate models.
//!
//! All rates are WAD scaled and expressed per second.

use soroban_sdk::contracttype;

use crate::constants::{
    MAX_ADJUSTMENT_RATE, MAX_ADJUSTMENT_VELOCITY, MAX_DECAY_RATE, MIN_ADJUSTMENT_RATE,
    MIN_ADJUSTMENT_VELOCITY, WAD,
};
use crate::errors::LendingError;
use crate::math::{checked_add, mul_div_down, wad_mul};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurveConfig {
    /// Slope applied below the vertex.
    pub base_rate: u128,
    /// Slope applied above the vertex, before any multiplier.
    pub vertex_rate: u128,
    /// Utilization where the second slope begins.
    pub vertex_start: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdjustmentConfig {
    /// Seconds between multiplier updates.
    pub adjustment_rate: u64,
    pub adjustment_velocity: u128,
    pub decay_rate: u128,
    pub vertex_multiplier_max: u128,
    /// Utilization at or above which the multiplier grows.
    pub increase_threshold_start: u128,
    /// Utilization at or below which the multiplier shrinks.
    pub decrease_threshold_end: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DynamicRateState {
    pub vertex_multiplier: u128,
    pub next_update_timestamp: u64,
}

pub fn utilization_rate(cash: u128, borrows: u128, reserves: u128) -> Result<u128, LendingError> {
    if borrows == 0 {
        return Ok(0);
    }
    let pool = checked_add(cash, borrows)?
        .checked_sub(reserves)
        .ok_or(LendingError::MathOverflow)?;
    if pool == 0 {
        return Ok(0);
    }
    mul_div_down(borrows, WAD, pool)
}

impl CurveConfig {
    pub fn validate(&self) -> Result<(), LendingError> {
        if self.vertex_start == 0 || self.vertex_start >= WAD {
            return Err(LendingError::InvalidConfiguration);
        }
        Ok(())
    }

    /// Borrow rate at `util` with the vertex slope scaled by `multiplier`.
    pub fn borrow_rate(&self, util: u128, multiplier: u128) -> Result<u128, LendingError> {
        if util <= self.vertex_start {
            return wad_mul(util, self.base_rate);
        }
        let below = wad_mul(self.vertex_start, self.base_rate)?;
        let above = wad_mul(util - self.vertex_start, self.vertex_rate)?;
        checked_add(below, wad_mul(above, multiplier)?)
    }

    pub fn supply_rate(
        &self,
        util: u128,
        multiplier: u128,
        reserve_factor: u128,
    ) -> Result<u128, LendingError> {
        let borrow_rate = self.borrow_rate(util, multiplier)?;
        let to_lenders = wad_mul(borrow_rate, WAD.saturating_sub(reserve_factor))?;
        wad_mul(util, to_lenders)
    }
}

impl AdjustmentConfig {
    pub fn validate(&self, curve: &CurveConfig) -> Result<(), LendingError> {
        if self.adjustment_rate < MIN_ADJUSTMENT_RATE || self.adjustment_rate > MAX_ADJUSTMENT_RATE
        {
            return Err(LendingError::InvalidConfiguration);
        }
        if self.adjustment_velocity < MIN_ADJUSTMENT_VELOCITY
            || self.adjustment_velocity > MAX_ADJUSTMENT_VELOCITY
        {
            return Err(LendingError::InvalidConfiguration);
        }
        if self.decay_rate > MAX_DECAY_RATE {
            return Err(LendingError::InvalidConfiguration);
        }
        if self.vertex_multiplier_max < WAD {
            return Err(LendingError::InvalidConfiguration);
        }
        if self.increase_threshold_start > WAD
            || self.decrease_threshold_end >= self.increase_threshold_start
        {
            return Err(LendingError::InvalidConfiguration);
        }
        // the adjusted vertex slope must stay representable
        if curve
            .vertex_rate
            .checked_mul(self.vertex_multiplier_max)
            .is_none()
        {
            return Err(LendingError::InvalidConfiguration);
        }
        Ok(())
    }

    /// Next vertex multiplier for the observed utilization.
    pub fn next_multiplier(&self, util: u128, current: u128) -> Result<u128, LendingError> {
        let mut multiplier = current;
        if util >= self.increase_threshold_start {
            let c_factor = if self.increase_threshold_start >= WAD {
                WAD
            } else {
                mul_div_down(
                    util.min(WAD) - self.increase_threshold_start,
                    WAD,
                    WAD - self.increase_threshold_start,
                )?
            };
            let step = checked_add(WAD, wad_mul(self.adjustment_velocity, c_factor)?)?;
            multiplier = wad_mul(multiplier, step)?;
        } else if util <= self.decrease_threshold_end {
            // shrinks at full velocity anywhere inside the band
            let step = checked_add(WAD, self.adjustment_velocity)?;
            multiplier = mul_div_down(multiplier, WAD, step)?;
        }
        // decay always pulls toward 1x
        let decay = wad_mul(multiplier, self.decay_rate)?;
        multiplier = multiplier.saturating_sub(decay);
        Ok(multiplier.clamp(WAD, self.vertex_multiplier_max))
    }
}
