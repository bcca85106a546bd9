//! Fixed-point helpers for the farm ledger.
//!
//! Amounts are `U256` scaled by 1e18 (wad). Division always truncates, and
//! multiplication is checked so an overflow surfaces as
//! [`FarmError::ArithmeticOverflow`] instead of wrapping.

use odra::casper_types::U256;

use crate::farm::FarmError;

/// 1 wad = 1e18
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Block time is reported in milliseconds.
pub const MILLIS_PER_DAY: u64 = 86_400_000;
pub const DAYS_PER_MONTH: u64 = 30;
pub const DAYS_PER_YEAR: u64 = 365;

/// Pool share is reported in parts per ten thousand (10_000 = 100%).
pub const SHARE_SCALE: u64 = 10_000;

/// Upper bound on the pool's total stake (1e18 whole tokens).
pub const MAX_TOTAL_STAKED_TOKENS: u64 = 1_000_000_000_000_000_000;
/// Longest interval a single settlement accrues for (100 years in ms).
pub const MAX_ACCRUAL_WINDOW_MS: u64 = 100 * DAYS_PER_YEAR * MILLIS_PER_DAY;

/// Whole tokens to wad.
pub fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WAD)
}

pub fn checked_add(a: U256, b: U256) -> Result<U256, FarmError> {
    a.checked_add(b).ok_or(FarmError::ArithmeticOverflow)
}

pub fn checked_mul(a: U256, b: U256) -> Result<U256, FarmError> {
    a.checked_mul(b).ok_or(FarmError::ArithmeticOverflow)
}

pub fn max_total_staked() -> U256 {
    tokens(MAX_TOTAL_STAKED_TOKENS)
}

/// Largest daily reward pool for which `staked * pool * elapsed` fits in
/// a U256 whenever staked and elapsed stay within their bounds.
pub fn max_daily_reward_pool() -> U256 {
    U256::MAX / (max_total_staked() * U256::from(MAX_ACCRUAL_WINDOW_MS))
}

/// Reject a daily reward pool that could overflow a settlement.
pub fn check_daily_reward_pool(pool: U256) -> Result<U256, FarmError> {
    if pool > max_daily_reward_pool() {
        return Err(FarmError::ArithmeticOverflow);
    }
    Ok(pool)
}

/// `floor(a * b / c)`. A zero divisor yields zero: an empty pool pays nothing.
pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, FarmError> {
    if c.is_zero() {
        return Ok(U256::zero());
    }
    Ok(checked_mul(a, b)? / c)
}

/// Share of `part` in `whole`, in parts per ten thousand, rounded down.
pub fn share_permil(part: U256, whole: U256) -> Result<u64, FarmError> {
    let share = mul_div(part, U256::from(SHARE_SCALE), whole)?;
    // Only reachable with part > whole.
    if share > U256::from(SHARE_SCALE) {
        return Ok(SHARE_SCALE);
    }
    Ok(share.as_u64())
}
