//! Reward accrual policies.
//!
//! [`ProportionalAccrual`] pays an account its share of the daily reward pool
//! for the time elapsed since its last settlement:
//!
//! ```text
//! pending = staked * daily_reward_pool * elapsed / (total_staked * MILLIS_PER_DAY)
//! ```
//!
//! The share is the one in force at settlement time and is applied to the
//! whole unsettled interval. When other accounts change the pool total in
//! between, this is an approximation, not a time integral of the share.
//!
//! One settlement accrues for at most [`math::MAX_ACCRUAL_WINDOW_MS`]. Together
//! with the caps on total stake and on the daily pool this keeps the
//! numerator inside a U256.
//!
//! [`FullStakeIssuance`] is the legacy policy: an explicit owner call pays each
//! staker its full stake once, and elapsed time earns nothing.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::farm::FarmError;
use crate::ledger::{Account, Pool};
use crate::math::{self, DAYS_PER_MONTH, DAYS_PER_YEAR, MILLIS_PER_DAY};

/// What makes a policy realize rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccrualTrigger {
    /// Rewards grow with elapsed time and are realized at every settlement.
    Elapsed,
    /// Rewards are realized only by an explicit privileged call.
    Explicit,
}

pub trait AccrualPolicy {
    fn trigger(&self) -> AccrualTrigger;

    /// Reward owed to `account` for `elapsed_ms` under the current `pool`.
    fn realize(
        &self,
        account: &Account,
        pool: &Pool,
        elapsed_ms: u64,
    ) -> Result<U256, FarmError>;
}

pub struct ProportionalAccrual;

impl AccrualPolicy for ProportionalAccrual {
    fn trigger(&self) -> AccrualTrigger {
        AccrualTrigger::Elapsed
    }

    fn realize(
        &self,
        account: &Account,
        pool: &Pool,
        elapsed_ms: u64,
    ) -> Result<U256, FarmError> {
        if account.staked_amount.is_zero() || pool.total_staked.is_zero() || elapsed_ms == 0 {
            return Ok(U256::zero());
        }
        let elapsed_ms = elapsed_ms.min(math::MAX_ACCRUAL_WINDOW_MS);
        let numerator = math::checked_mul(
            math::checked_mul(account.staked_amount, pool.daily_reward_pool)?,
            U256::from(elapsed_ms),
        )?;
        let denominator = math::checked_mul(pool.total_staked, U256::from(MILLIS_PER_DAY))?;
        Ok(numerator / denominator)
    }
}

pub struct FullStakeIssuance;

impl AccrualPolicy for FullStakeIssuance {
    fn trigger(&self) -> AccrualTrigger {
        AccrualTrigger::Explicit
    }

    fn realize(
        &self,
        account: &Account,
        _pool: &Pool,
        _elapsed_ms: u64,
    ) -> Result<U256, FarmError> {
        Ok(account.staked_amount)
    }
}

/// Configured accrual policy of a farm.
#[odra::odra_type]
#[derive(Default)]
pub enum AccrualMode {
    #[default]
    Proportional = 0,
    FullStakeIssuance = 1,
}

impl AccrualMode {
    pub fn policy(&self) -> &'static dyn AccrualPolicy {
        match self {
            AccrualMode::Proportional => &ProportionalAccrual,
            AccrualMode::FullStakeIssuance => &FullStakeIssuance,
        }
    }

    /// Reward realized by a settlement after `elapsed_ms`; zero for explicit policies.
    pub fn settle(
        &self,
        account: &Account,
        pool: &Pool,
        elapsed_ms: u64,
    ) -> Result<U256, FarmError> {
        let policy = self.policy();
        match policy.trigger() {
            AccrualTrigger::Elapsed => policy.realize(account, pool, elapsed_ms),
            AccrualTrigger::Explicit => Ok(U256::zero()),
        }
    }
}

/// Reward projection for display. Derived on demand, never stored.
#[odra::odra_type]
pub struct RewardSnapshot {
    pub daily_reward: U256,
    pub monthly_reward: U256,
    pub annual_reward: U256,
    /// Parts per ten thousand of the pool.
    pub share_permil: u64,
}

pub fn project(
    mode: &AccrualMode,
    account: &Account,
    pool: &Pool,
) -> Result<RewardSnapshot, FarmError> {
    Ok(RewardSnapshot {
        daily_reward: mode.settle(account, pool, MILLIS_PER_DAY)?,
        monthly_reward: mode.settle(account, pool, DAYS_PER_MONTH * MILLIS_PER_DAY)?,
        annual_reward: mode.settle(account, pool, DAYS_PER_YEAR * MILLIS_PER_DAY)?,
        share_permil: math::share_permil(account.staked_amount, pool.total_staked)?,
    })
}

/// Realized debt plus what a settlement at `now` would add.
pub fn pending_reward(
    mode: &AccrualMode,
    account: &Account,
    pool: &Pool,
    now: u64,
) -> Result<U256, FarmError> {
    let elapsed = now.saturating_sub(account.last_settlement_time);
    math::checked_add(account.reward_debt, mode.settle(account, pool, elapsed)?)
}
