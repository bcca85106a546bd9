//! Faucet: fixed stake-asset handouts gated by a per-account cooldown.
//!
//! Independent of the staking ledger. The faucet only decides whether a
//! claim is allowed and records it; the owning token mints the amount.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::math;

/// Stake-asset credited per faucet claim (10 tokens).
pub const FAUCET_AMOUNT_TOKENS: u64 = 10;
/// Minimum time between two claims of one account (24h in ms).
pub const FAUCET_COOLDOWN_MS: u64 = math::MILLIS_PER_DAY;

#[odra::odra_error]
pub enum FaucetError {
    CooldownActive = 60010,
}

pub fn faucet_amount() -> U256 {
    math::tokens(FAUCET_AMOUNT_TOKENS)
}

/// Time left until `last_claim` allows another claim at `now`; zero when claimable.
pub fn cooldown_remaining(last_claim: Option<u64>, now: u64) -> u64 {
    match last_claim {
        None => 0,
        Some(last) => FAUCET_COOLDOWN_MS.saturating_sub(now.saturating_sub(last)),
    }
}

#[odra::module]
pub struct Faucet {
    last_claim: Mapping<Address, u64>,
}

impl Faucet {
    /// Record a claim by `account` at `now`. Returns the amount to credit.
    pub fn claim(&mut self, account: &Address, now: u64) -> Result<U256, FaucetError> {
        if cooldown_remaining(self.last_claim(account), now) > 0 {
            return Err(FaucetError::CooldownActive);
        }
        self.last_claim.set(account, now);
        Ok(faucet_amount())
    }

    pub fn last_claim(&self, account: &Address) -> Option<u64> {
        self.last_claim.get(account)
    }

    pub fn remaining(&self, account: &Address, now: u64) -> u64 {
        cooldown_remaining(self.last_claim(account), now)
    }
}
