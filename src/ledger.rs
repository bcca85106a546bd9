//! Account ledger: per-account staking records and the pool aggregate.
//!
//! Mutations work on copies of [`Account`] and [`Pool`] and only reach
//! storage through [`AccountLedger::commit`], which writes both together.
//! A failed mutation therefore leaves nothing behind.

use alloc::vec::Vec;
use odra::casper_types::U256;
use odra::prelude::*;

use crate::farm::FarmError;
use crate::math;

/// Staking record of one account. Created zeroed on first use and never removed.
#[odra::odra_type]
#[derive(Default)]
pub struct Account {
    pub staked_amount: U256,
    /// Realized reward not yet claimed.
    pub reward_debt: U256,
    /// Block time (ms) of the last settlement.
    pub last_settlement_time: u64,
}

impl Account {
    pub fn is_staking(&self) -> bool {
        !self.staked_amount.is_zero()
    }

    /// Realize `reward` into the debt and restart the accrual clock at `now`.
    pub fn settle(&mut self, reward: U256, now: u64) -> Result<(), FarmError> {
        self.reward_debt = math::checked_add(self.reward_debt, reward)?;
        self.last_settlement_time = now;
        Ok(())
    }

    /// Zero the debt and return what it held.
    pub fn take_reward(&mut self) -> Result<U256, FarmError> {
        if self.reward_debt.is_zero() {
            return Err(FarmError::NothingToClaim);
        }
        Ok(core::mem::take(&mut self.reward_debt))
    }
}

/// Pool aggregate. `total_staked` always equals the sum of every account's stake.
#[odra::odra_type]
#[derive(Default)]
pub struct Pool {
    pub total_staked: U256,
    /// Reward-asset amount distributed across all stakers per day (wad).
    pub daily_reward_pool: U256,
}

/// Add `amount` to the account stake and the pool total.
pub fn stake(account: &mut Account, pool: &mut Pool, amount: U256) -> Result<(), FarmError> {
    if amount.is_zero() {
        return Err(FarmError::InsufficientBalance);
    }
    let staked = math::checked_add(account.staked_amount, amount)?;
    let total = math::checked_add(pool.total_staked, amount)?;
    if total > math::max_total_staked() {
        return Err(FarmError::ArithmeticOverflow);
    }

    account.staked_amount = staked;
    pool.total_staked = total;
    Ok(())
}

/// Remove `amount` from the account stake and the pool total.
pub fn unstake(account: &mut Account, pool: &mut Pool, amount: U256) -> Result<(), FarmError> {
    if amount.is_zero() || amount > account.staked_amount {
        return Err(FarmError::InsufficientBalance);
    }
    let total = pool
        .total_staked
        .checked_sub(amount)
        .ok_or(FarmError::InsufficientBalance)?;

    account.staked_amount -= amount;
    pool.total_staked = total;
    Ok(())
}

/// Remove the whole stake. Returns the amount released.
pub fn unstake_all(account: &mut Account, pool: &mut Pool) -> Result<U256, FarmError> {
    let amount = account.staked_amount;
    unstake(account, pool, amount)?;
    Ok(amount)
}

/// Storage owner of every [`Account`] and of the [`Pool`].
#[odra::module]
pub struct AccountLedger {
    accounts: Mapping<Address, Account>,
    pool: Var<Pool>,
    // Every account that ever committed, in first-seen order. Never pruned,
    // so admin walks over it grow with the number of distinct stakers.
    stakers: List<Address>,
    indexed: Mapping<Address, bool>,
}

impl AccountLedger {
    pub fn init(&mut self, daily_reward_pool: U256) {
        self.pool.set(Pool {
            total_staked: U256::zero(),
            daily_reward_pool,
        });
    }

    pub fn account(&self, owner: &Address) -> Account {
        self.accounts.get(owner).unwrap_or_default()
    }

    pub fn pool(&self) -> Pool {
        self.pool.get_or_default()
    }

    /// Write the account and the pool in one step.
    pub fn commit(&mut self, owner: &Address, account: Account, pool: Pool) {
        if !self.indexed.get(owner).unwrap_or_default() {
            self.indexed.set(owner, true);
            self.stakers.push(*owner);
        }
        self.accounts.set(owner, account);
        self.pool.set(pool);
    }

    pub fn set_daily_reward_pool(&mut self, daily_reward_pool: U256) {
        let mut pool = self.pool();
        pool.daily_reward_pool = daily_reward_pool;
        self.pool.set(pool);
    }

    pub fn stakers(&self) -> Vec<Address> {
        (0..self.stakers.len())
            .filter_map(|index| self.stakers.get(index))
            .collect()
    }

    pub fn stakers_count(&self) -> u32 {
        self.stakers.len()
    }
}
