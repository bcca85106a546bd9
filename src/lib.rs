//! Token Farm: staking ledger with proportional reward accrual (Odra)
//!
//! This crate implements a token staking farm on Casper using Odra framework.
//! - StakeToken: stake asset with a cooldown-gated faucet
//! - RewardToken: fixed-supply reward asset
//! - TokenFarm: staking ledger that settles, stakes, unstakes and pays rewards

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod accrual;
pub mod faucet;
pub mod farm;
pub mod ledger;
pub mod math;
pub mod settlement;
pub mod tokens;
