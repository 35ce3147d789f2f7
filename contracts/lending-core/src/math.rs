//! Fixed point helpers. Every product is checked; overflow surfaces as
//! [`LendingError::MathOverflow`] instead of saturating.

use crate::constants::WAD;
use crate::errors::LendingError;

/// `floor(a * b / c)`.
pub fn mul_div_down(a: u128, b: u128, c: u128) -> Result<u128, LendingError> {
    if c == 0 {
        return Err(LendingError::MathOverflow);
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / c);
    }
    // floor(a*b/c) = (a/c)*b + floor((a%c)*b/c)
    let whole = (a / c).checked_mul(b).ok_or(LendingError::MathOverflow)?;
    let part = (a % c).checked_mul(b).ok_or(LendingError::MathOverflow)? / c;
    whole.checked_add(part).ok_or(LendingError::MathOverflow)
}

/// `ceil(a * b / c)`.
pub fn mul_div_up(a: u128, b: u128, c: u128) -> Result<u128, LendingError> {
    let down = mul_div_down(a, b, c)?;
    let remainder = match a.checked_mul(b) {
        Some(product) => product % c,
        None => ((a % c).checked_mul(b).ok_or(LendingError::MathOverflow)?) % c,
    };
    if remainder == 0 {
        Ok(down)
    } else {
        down.checked_add(1).ok_or(LendingError::MathOverflow)
    }
}

pub fn wad_mul(a: u128, b: u128) -> Result<u128, LendingError> {
    mul_div_down(a, b, WAD)
}

pub fn wad_mul_up(a: u128, b: u128) -> Result<u128, LendingError> {
    mul_div_up(a, b, WAD)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, LendingError> {
    a.checked_add(b).ok_or(LendingError::MathOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, LendingError> {
    a.checked_sub(b).ok_or(LendingError::MathOverflow)
}

pub fn to_i128(value: u128) -> Result<i128, LendingError> {
    i128::try_from(value).map_err(|_| LendingError::MathOverflow)
}

pub fn to_u128(value: i128) -> u128 {
    if value <= 0 {
        0
    } else {
        value as u128
    }
}
