//! Per-account settlement phases.
//!
//! Every mutating farm call walks `Idle -> Settling -> Mutating -> Committed`.
//! The phase is persisted per account, so a call that arrives while another
//! one for the same account is still `Settling` or `Mutating` is rejected.
//! A failed call reverts the host transaction and with it the phase write,
//! so `Reverted` never reaches storage.

use odra::prelude::*;

use crate::farm::FarmError;

#[odra::odra_type]
#[derive(Default)]
pub enum SettlementPhase {
    #[default]
    Idle = 0,
    Settling = 1,
    Mutating = 2,
    Committed = 3,
    Reverted = 4,
}

impl SettlementPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SettlementPhase::Settling | SettlementPhase::Mutating)
    }

    /// Start a call. Fails if one is already in flight for the account.
    pub fn enter(&self) -> Result<SettlementPhase, FarmError> {
        if self.is_in_flight() {
            return Err(FarmError::ReentrancyDetected);
        }
        Ok(SettlementPhase::Settling)
    }

    /// Pending reward realized; the ledger mutation may run.
    pub fn mutate(&self) -> Result<SettlementPhase, FarmError> {
        match self {
            SettlementPhase::Settling => Ok(SettlementPhase::Mutating),
            _ => Err(FarmError::ReentrancyDetected),
        }
    }

    pub fn commit(&self) -> Result<SettlementPhase, FarmError> {
        match self {
            SettlementPhase::Mutating => Ok(SettlementPhase::Committed),
            _ => Err(FarmError::ReentrancyDetected),
        }
    }

    pub fn revert(&self) -> SettlementPhase {
        SettlementPhase::Reverted
    }
}
