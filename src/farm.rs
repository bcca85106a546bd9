//! Token Farm staking contract
//!
//! Users stake the stake asset and earn the reward asset in proportion to
//! their share of the pool.
//! - Every mutating call settles the caller's pending reward first, then
//!   changes the stake, then commits account and pool together
//! - Rewards accrue per [`AccrualMode`]: continuously from a daily reward
//!   pool, or (legacy) through an owner-triggered one-shot issuance
//! - Calls for an account already mid-settlement are rejected
//!
//! ## Units
//! - Stake and reward assets: wad (U256), 18 decimals
//! - Time: block time in milliseconds

use alloc::string::String;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::accrual::{self, AccrualMode, AccrualTrigger, RewardSnapshot};
use crate::ledger::{self, Account, AccountLedger, Pool};
use crate::math::{self, DAYS_PER_YEAR, MILLIS_PER_DAY};
use crate::settlement::SettlementPhase;
use crate::tokens::{RewardTokenContractRef, StakeTokenContractRef};

// ==========================================
// Events
// ==========================================

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    use crate::accrual::AccrualMode;

    #[odra::event]
    pub struct Staked {
        pub account: Address,
        pub amount: U256,
        pub new_staked: U256,
        pub total_staked: U256,
    }

    #[odra::event]
    pub struct Unstaked {
        pub account: Address,
        pub amount: U256,
        pub new_staked: U256,
        pub total_staked: U256,
    }

    #[odra::event]
    pub struct RewardsSettled {
        pub account: Address,
        pub realized: U256,
        pub reward_debt: U256,
    }

    #[odra::event]
    pub struct RewardsClaimed {
        pub account: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct RewardsIssued {
        pub account: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct DailyRewardPoolUpdated {
        pub old_pool: U256,
        pub new_pool: U256,
    }

    #[odra::event]
    pub struct AccrualModeUpdated {
        pub old_mode: AccrualMode,
        pub new_mode: AccrualMode,
    }
}

// ==========================================
// Types
// ==========================================

/// Returned by get_user_staking_info
#[odra::odra_type]
pub struct StakingInfo {
    pub staked_amount: U256,
    pub is_staking: bool,
}

/// Returned by get_user_staking_data
#[odra::odra_type]
pub struct StakingData {
    pub staked_amount: U256,
    pub is_staking: bool,
    /// Realized debt plus reward accrued since the last settlement
    pub pending_reward: U256,
    pub last_settlement_time: u64,
    /// Reward per day at the current share
    pub daily_reward_rate: U256,
}

/// Returned by get_pool_stats
#[odra::odra_type]
pub struct PoolStats {
    pub total_staked: U256,
    pub daily_reward_pool: U256,
    pub implied_annual_pool: U256,
}

#[derive(Clone, Copy)]
enum Request {
    Stake(U256),
    Unstake(U256),
    UnstakeAll,
    Claim,
}

// ==========================================
// Errors
// ==========================================

#[odra::odra_error]
pub enum FarmError {
    InsufficientBalance = 1,
    InsufficientAllowance = 2,
    ArithmeticOverflow = 3,
    ReentrancyDetected = 4,
    NothingToClaim = 5,
    Unauthorized = 6,
    AccrualModeMismatch = 7,
}

// ==========================================
// Contract
// ==========================================

#[odra::module(
    events = [
        events::Staked,
        events::Unstaked,
        events::RewardsSettled,
        events::RewardsClaimed,
        events::RewardsIssued,
        events::DailyRewardPoolUpdated,
        events::AccrualModeUpdated
    ],
    errors = FarmError
)]
pub struct TokenFarm {
    // Token references
    stake_token: Var<Address>,
    reward_token: Var<Address>,

    // Accounts and pool totals
    ledger: SubModule<AccountLedger>,
    phases: Mapping<Address, SettlementPhase>,

    // Config
    accrual_mode: Var<AccrualMode>,

    // Admin
    owner: Var<Address>,
}

#[odra::module]
impl TokenFarm {
    // ==========================================
    // Initialization
    // ==========================================

    /// Initialize the farm. The caller becomes the owner.
    pub fn init(
        &mut self,
        stake_token: Address,
        reward_token: Address,
        daily_reward_pool: U256,
        accrual_mode: AccrualMode,
    ) {
        let daily_reward_pool = self.or_revert(math::check_daily_reward_pool(daily_reward_pool));
        self.stake_token.set(stake_token);
        self.reward_token.set(reward_token);
        self.ledger.init(daily_reward_pool);
        self.accrual_mode.set(accrual_mode);
        self.owner.set(self.env().caller());
    }

    // ==========================================
    // User Functions
    // ==========================================

    /// Stake `amount` of the stake asset.
    /// Requires a prior `approve` of at least `amount` for the farm.
    pub fn stake_tokens(&mut self, amount: U256) {
        let caller = self.env().caller();
        let result = self.process(caller, Request::Stake(amount));
        self.finish(&caller, result);
    }

    /// Unstake part of the caller's stake.
    pub fn unstake_tokens(&mut self, amount: U256) {
        let caller = self.env().caller();
        let result = self.process(caller, Request::Unstake(amount));
        self.finish(&caller, result);
    }

    /// Unstake the caller's whole stake.
    pub fn unstake_all_tokens(&mut self) {
        let caller = self.env().caller();
        let result = self.process(caller, Request::UnstakeAll);
        self.finish(&caller, result);
    }

    /// Pay out the caller's realized reward. Returns the amount paid.
    pub fn claim_rewards(&mut self) -> U256 {
        let caller = self.env().caller();
        let result = self.process(caller, Request::Claim);
        self.finish(&caller, result)
    }

    // ==========================================
    // Admin Functions
    // ==========================================

    /// Legacy issuance: pay every staker its full stake in reward asset (owner only).
    /// Only available while the farm runs the explicit-trigger accrual mode.
    pub fn issue_token(&mut self) {
        self.require_owner();
        if let Err(error) = self.issue_rewards() {
            self.env().revert(error);
        }
    }

    /// Change the daily reward pool (owner only).
    /// Every staker is settled at the old rate first.
    /// Fails with `ArithmeticOverflow` above [`math::max_daily_reward_pool`].
    pub fn set_daily_reward_pool(&mut self, new_pool: U256) {
        self.require_owner();
        let new_pool = self.or_revert(math::check_daily_reward_pool(new_pool));
        if let Err(error) = self.settle_all() {
            self.env().revert(error);
        }
        let old_pool = self.ledger.pool().daily_reward_pool;
        self.ledger.set_daily_reward_pool(new_pool);
        self.env().emit_event(events::DailyRewardPoolUpdated { old_pool, new_pool });
    }

    /// Switch the accrual policy (owner only).
    /// Every staker is settled under the old policy first.
    pub fn set_accrual_mode(&mut self, mode: AccrualMode) {
        self.require_owner();
        if let Err(error) = self.settle_all() {
            self.env().revert(error);
        }
        let old_mode = self.accrual_mode.get_or_default();
        self.accrual_mode.set(mode.clone());
        self.env().emit_event(events::AccrualModeUpdated {
            old_mode,
            new_mode: mode,
        });
    }

    // ==========================================
    // View Functions
    // ==========================================

    pub fn name(&self) -> String {
        "Token Farm".to_string()
    }

    /// Staked amount and whether it is non-zero
    pub fn get_user_staking_info(&self, account: Address) -> StakingInfo {
        let position = self.ledger.account(&account);
        StakingInfo {
            staked_amount: position.staked_amount,
            is_staking: position.is_staking(),
        }
    }

    /// Full staking position including the reward pending right now
    pub fn get_user_staking_data(&self, account: Address) -> StakingData {
        let mode = self.accrual_mode.get_or_default();
        let pool = self.ledger.pool();
        let position = self.ledger.account(&account);
        let now = self.env().get_block_time();

        let pending_reward = self.or_revert(accrual::pending_reward(&mode, &position, &pool, now));
        let daily_reward_rate = self.or_revert(mode.settle(&position, &pool, MILLIS_PER_DAY));

        StakingData {
            staked_amount: position.staked_amount,
            is_staking: position.is_staking(),
            pending_reward,
            last_settlement_time: position.last_settlement_time,
            daily_reward_rate,
        }
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        let pool = self.ledger.pool();
        let implied_annual_pool = self.or_revert(math::checked_mul(
            pool.daily_reward_pool,
            U256::from(DAYS_PER_YEAR),
        ));
        PoolStats {
            total_staked: pool.total_staked,
            daily_reward_pool: pool.daily_reward_pool,
            implied_annual_pool,
        }
    }

    /// Daily, monthly and annual reward at the current share, plus the share itself
    pub fn get_user_projected_rewards(&self, account: Address) -> RewardSnapshot {
        let mode = self.accrual_mode.get_or_default();
        let position = self.ledger.account(&account);
        self.or_revert(accrual::project(&mode, &position, &self.ledger.pool()))
    }

    pub fn staking_balance(&self, account: Address) -> U256 {
        self.ledger.account(&account).staked_amount
    }

    pub fn is_staking(&self, account: Address) -> bool {
        self.ledger.account(&account).is_staking()
    }

    /// Realized, unclaimed reward (excludes accrual since the last settlement)
    pub fn reward_debt_of(&self, account: Address) -> U256 {
        self.ledger.account(&account).reward_debt
    }

    /// Stake-asset wallet balance of the account
    pub fn get_user_stake_token_balance(&self, account: Address) -> U256 {
        self.stake_token_ref().balance_of(account)
    }

    /// Reward-asset wallet balance of the account
    pub fn get_user_reward_token_balance(&self, account: Address) -> U256 {
        self.reward_token_ref().balance_of(account)
    }

    pub fn total_staked(&self) -> U256 {
        self.ledger.pool().total_staked
    }

    pub fn daily_reward_pool(&self) -> U256 {
        self.ledger.pool().daily_reward_pool
    }

    pub fn accrual_mode(&self) -> AccrualMode {
        self.accrual_mode.get_or_default()
    }

    /// Number of accounts that ever staked
    pub fn stakers_count(&self) -> u32 {
        self.ledger.stakers_count()
    }

    pub fn settlement_phase_of(&self, account: Address) -> SettlementPhase {
        self.phase_of(&account)
    }

    pub fn stake_token(&self) -> Option<Address> {
        self.stake_token.get()
    }

    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }
}

// ==========================================
// Internal Functions
// ==========================================

impl TokenFarm {
    /// Run one mutating request for `account`:
    /// guard, settle, mutate, commit, move assets, release.
    ///
    /// The phase stays in flight across the outgoing token call. Neither
    /// bundled token calls back into the farm on transfer, so the
    /// `ReentrancyDetected` path is only reachable through a stake or
    /// reward asset with receiver hooks.
    fn process(&mut self, account: Address, request: Request) -> Result<U256, FarmError> {
        let phase = self.phase_of(&account).enter()?;
        self.phases.set(&account, phase.clone());

        let now = self.env().get_block_time();
        let mode = self.accrual_mode.get_or_default();
        let mut pool = self.ledger.pool();
        let mut position = self.ledger.account(&account);
        self.settle_position(&account, &mode, &mut position, &pool, now)?;

        let phase = phase.mutate()?;
        self.phases.set(&account, phase.clone());

        let amount = match request {
            Request::Stake(amount) => {
                ledger::stake(&mut position, &mut pool, amount)?;
                self.pull_stake_asset(account, amount)?;
                amount
            }
            Request::Unstake(amount) => {
                ledger::unstake(&mut position, &mut pool, amount)?;
                amount
            }
            Request::UnstakeAll => ledger::unstake_all(&mut position, &mut pool)?,
            Request::Claim => position.take_reward()?,
        };

        let new_staked = position.staked_amount;
        let total_staked = pool.total_staked;
        self.ledger.commit(&account, position, pool);

        match request {
            Request::Stake(_) => {
                self.env().emit_event(events::Staked {
                    account,
                    amount,
                    new_staked,
                    total_staked,
                });
            }
            Request::Unstake(_) | Request::UnstakeAll => {
                self.stake_token_ref().transfer(account, amount);
                self.env().emit_event(events::Unstaked {
                    account,
                    amount,
                    new_staked,
                    total_staked,
                });
            }
            Request::Claim => {
                self.reward_token_ref().transfer(account, amount);
                self.env().emit_event(events::RewardsClaimed { account, amount });
            }
        }

        self.phases.set(&account, phase.commit()?);
        Ok(amount)
    }

    /// Realize the reward accrued since the last settlement into the debt.
    fn settle_position(
        &self,
        owner: &Address,
        mode: &AccrualMode,
        position: &mut Account,
        pool: &Pool,
        now: u64,
    ) -> Result<(), FarmError> {
        let elapsed = now.saturating_sub(position.last_settlement_time);
        let realized = mode.settle(position, pool, elapsed)?;
        position.settle(realized, now)?;

        if !realized.is_zero() {
            self.env().emit_event(events::RewardsSettled {
                account: *owner,
                realized,
                reward_debt: position.reward_debt,
            });
        }
        Ok(())
    }

    /// Settle every indexed account that still has stake at the current
    /// configuration. Accounts without stake accrue nothing and are left
    /// untouched, but the walk still visits every account that ever staked.
    fn settle_all(&mut self) -> Result<(), FarmError> {
        let now = self.env().get_block_time();
        let mode = self.accrual_mode.get_or_default();
        for staker in self.ledger.stakers() {
            let mut position = self.ledger.account(&staker);
            if !position.is_staking() {
                continue;
            }
            self.phase_of(&staker).enter()?;
            let pool = self.ledger.pool();
            self.settle_position(&staker, &mode, &mut position, &pool, now)?;
            self.ledger.commit(&staker, position, pool);
        }
        Ok(())
    }

    /// Pay each staker what the explicit-trigger policy realizes for it.
    fn issue_rewards(&mut self) -> Result<U256, FarmError> {
        let policy = self.accrual_mode.get_or_default().policy();
        if policy.trigger() != AccrualTrigger::Explicit {
            return Err(FarmError::AccrualModeMismatch);
        }

        let pool = self.ledger.pool();
        let mut token = self.reward_token_ref();
        let mut issued = U256::zero();
        for staker in self.ledger.stakers() {
            let position = self.ledger.account(&staker);
            if !position.is_staking() {
                continue;
            }
            self.phase_of(&staker).enter()?;
            let reward = policy.realize(&position, &pool, 0)?;
            issued = math::checked_add(issued, reward)?;
            token.transfer(staker, reward);
            self.env().emit_event(events::RewardsIssued {
                account: staker,
                amount: reward,
            });
        }
        Ok(issued)
    }

    /// Move `amount` of stake asset from `from` into the farm.
    fn pull_stake_asset(&mut self, from: Address, amount: U256) -> Result<(), FarmError> {
        let mut token = self.stake_token_ref();
        let farm = self.env().self_address();

        if token.balance_of(from) < amount {
            return Err(FarmError::InsufficientBalance);
        }
        if token.allowance(from, farm) < amount {
            return Err(FarmError::InsufficientAllowance);
        }
        token.transfer_from(from, farm, amount);
        Ok(())
    }

    /// Unwrap a request result, reverting the whole call on error.
    fn finish<T>(&mut self, account: &Address, result: Result<T, FarmError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                let phase = self.phase_of(account).revert();
                self.phases.set(account, phase);
                self.env().revert(error)
            }
        }
    }

    fn or_revert<T>(&self, result: Result<T, FarmError>) -> T {
        result.unwrap_or_else(|error| self.env().revert(error))
    }

    fn phase_of(&self, account: &Address) -> SettlementPhase {
        self.phases.get(account).unwrap_or_default()
    }

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(FarmError::Unauthorized);
        }
    }

    fn stake_token_ref(&self) -> StakeTokenContractRef {
        let address = self.stake_token.get().expect("stake token not set");
        StakeTokenContractRef::new(self.env().clone(), address)
    }

    fn reward_token_ref(&self) -> RewardTokenContractRef {
        let address = self.reward_token.get().expect("reward token not set");
        RewardTokenContractRef::new(self.env().clone(), address)
    }
}
