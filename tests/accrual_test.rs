//! Accrual, ledger and settlement-phase unit tests (no contract deployment)

use odra::casper_types::U256;

use token_farm::accrual::{
    self, AccrualMode, AccrualPolicy, AccrualTrigger, FullStakeIssuance, ProportionalAccrual,
};
use token_farm::farm::FarmError;
use token_farm::faucet::{cooldown_remaining, FAUCET_COOLDOWN_MS};
use token_farm::ledger::{self, Account, Pool};
use token_farm::math::{self, tokens, MILLIS_PER_DAY};
use token_farm::settlement::SettlementPhase;

fn account(staked: u64) -> Account {
    Account {
        staked_amount: tokens(staked),
        reward_debt: U256::zero(),
        last_settlement_time: 0,
    }
}

fn pool(total: u64, daily: u64) -> Pool {
    Pool {
        total_staked: tokens(total),
        daily_reward_pool: tokens(daily),
    }
}

// ==========================================
// Math
// ==========================================

#[test]
fn test_mul_div_truncates() {
    let result = math::mul_div(U256::from(10u64), U256::from(1u64), U256::from(3u64));
    assert_eq!(result.ok(), Some(U256::from(3u64)));
}

#[test]
fn test_mul_div_zero_divisor_is_zero() {
    let result = math::mul_div(U256::from(10u64), U256::from(10u64), U256::zero());
    assert_eq!(result.ok(), Some(U256::zero()));
}

#[test]
fn test_mul_div_overflow() {
    let result = math::mul_div(U256::MAX, U256::from(2u64), U256::one());
    assert!(matches!(result, Err(FarmError::ArithmeticOverflow)));
}

#[test]
fn test_share_permil() {
    assert_eq!(math::share_permil(tokens(1), tokens(4)).ok(), Some(2_500));
    assert_eq!(math::share_permil(tokens(4), tokens(4)).ok(), Some(10_000));
    assert_eq!(math::share_permil(tokens(1), U256::zero()).ok(), Some(0));
}

// ==========================================
// Accrual policies
// ==========================================

#[test]
fn test_proportional_full_day_full_share() {
    let realized = ProportionalAccrual.realize(&account(100), &pool(100, 1000), MILLIS_PER_DAY);
    assert_eq!(realized.ok(), Some(tokens(1000)));
}

#[test]
fn test_proportional_scales_with_share_and_time() {
    let half_day = MILLIS_PER_DAY / 2;
    let realized = ProportionalAccrual.realize(&account(25), &pool(100, 1000), half_day);
    assert_eq!(realized.ok(), Some(tokens(125)));
}

#[test]
fn test_proportional_zero_cases() {
    let policy = ProportionalAccrual;
    assert_eq!(
        policy.realize(&account(0), &pool(100, 1000), MILLIS_PER_DAY).ok(),
        Some(U256::zero())
    );
    assert_eq!(
        policy.realize(&account(10), &pool(0, 1000), MILLIS_PER_DAY).ok(),
        Some(U256::zero())
    );
    assert_eq!(
        policy.realize(&account(10), &pool(10, 1000), 0).ok(),
        Some(U256::zero())
    );
}

#[test]
fn test_proportional_overflow_is_reported() {
    let whale = Account {
        staked_amount: U256::MAX,
        ..Default::default()
    };
    let pool = Pool {
        total_staked: U256::MAX,
        daily_reward_pool: tokens(1000),
    };
    let realized = ProportionalAccrual.realize(&whale, &pool, MILLIS_PER_DAY);
    assert!(matches!(realized, Err(FarmError::ArithmeticOverflow)));
}

#[test]
fn test_full_stake_issuance_is_explicit() {
    assert_eq!(FullStakeIssuance.trigger(), AccrualTrigger::Explicit);
    assert_eq!(ProportionalAccrual.trigger(), AccrualTrigger::Elapsed);
    assert_eq!(
        FullStakeIssuance.realize(&account(42), &pool(100, 1000), 0).ok(),
        Some(tokens(42))
    );

    // Settlement never realizes anything under an explicit policy
    let settled = AccrualMode::FullStakeIssuance.settle(&account(42), &pool(100, 1000), MILLIS_PER_DAY);
    assert_eq!(settled.ok(), Some(U256::zero()));
}

#[test]
fn test_projection_windows() {
    let snapshot = accrual::project(&AccrualMode::Proportional, &account(10), &pool(40, 1000));
    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(_) => panic!("projection failed"),
    };
    assert_eq!(snapshot.daily_reward, tokens(250));
    assert_eq!(snapshot.monthly_reward, tokens(250 * 30));
    assert_eq!(snapshot.annual_reward, tokens(250 * 365));
    assert_eq!(snapshot.share_permil, 2_500);
}

#[test]
fn test_pending_reward_adds_unsettled_accrual() {
    let position = Account {
        staked_amount: tokens(50),
        reward_debt: tokens(7),
        last_settlement_time: MILLIS_PER_DAY,
    };
    let pending = accrual::pending_reward(
        &AccrualMode::Proportional,
        &position,
        &pool(50, 1000),
        2 * MILLIS_PER_DAY,
    );
    assert_eq!(pending.ok(), Some(tokens(1007)));

    // A clock behind the last settlement accrues nothing
    let pending = accrual::pending_reward(&AccrualMode::Proportional, &position, &pool(50, 1000), 0);
    assert_eq!(pending.ok(), Some(tokens(7)));
}

#[test]
fn test_settlement_at_bounds_does_not_overflow() {
    let position = Account {
        staked_amount: math::max_total_staked(),
        ..Default::default()
    };
    let pool = Pool {
        total_staked: math::max_total_staked(),
        daily_reward_pool: math::max_daily_reward_pool(),
    };
    let realized = ProportionalAccrual.realize(&position, &pool, math::MAX_ACCRUAL_WINDOW_MS);
    assert!(realized.is_ok());

    // Longer gaps accrue as the longest window
    let beyond = ProportionalAccrual.realize(&position, &pool, u64::MAX);
    assert_eq!(beyond.ok(), realized.ok());
}

#[test]
fn test_daily_reward_pool_bound() {
    let max = math::max_daily_reward_pool();
    assert_eq!(math::check_daily_reward_pool(max).ok(), Some(max));
    assert!(matches!(
        math::check_daily_reward_pool(max + U256::one()),
        Err(FarmError::ArithmeticOverflow)
    ));
}

// ==========================================
// Ledger
// ==========================================

#[test]
fn test_ledger_stake_and_unstake() {
    let mut position = Account::default();
    let mut totals = pool(0, 1000);

    assert!(ledger::stake(&mut position, &mut totals, tokens(8)).is_ok());
    assert!(position.is_staking());
    assert!(ledger::unstake(&mut position, &mut totals, tokens(3)).is_ok());
    assert_eq!(position.staked_amount, tokens(5));
    assert_eq!(totals.total_staked, tokens(5));

    assert_eq!(ledger::unstake_all(&mut position, &mut totals).ok(), Some(tokens(5)));
    assert!(!position.is_staking());
    assert_eq!(totals.total_staked, U256::zero());
}

#[test]
fn test_ledger_rejects_invalid_amounts() {
    let mut position = account(5);
    let mut totals = pool(5, 1000);

    assert!(matches!(
        ledger::stake(&mut position, &mut totals, U256::zero()),
        Err(FarmError::InsufficientBalance)
    ));
    assert!(matches!(
        ledger::unstake(&mut position, &mut totals, tokens(6)),
        Err(FarmError::InsufficientBalance)
    ));
    assert!(matches!(
        ledger::unstake(&mut position, &mut totals, U256::zero()),
        Err(FarmError::InsufficientBalance)
    ));
    assert_eq!(position.staked_amount, tokens(5));
    assert_eq!(totals.total_staked, tokens(5));

    let mut empty = Account::default();
    assert!(matches!(
        ledger::unstake_all(&mut empty, &mut totals),
        Err(FarmError::InsufficientBalance)
    ));
}

#[test]
fn test_ledger_caps_total_stake() {
    let mut position = Account::default();
    let mut totals = Pool {
        total_staked: math::max_total_staked(),
        daily_reward_pool: tokens(1000),
    };
    assert!(matches!(
        ledger::stake(&mut position, &mut totals, U256::one()),
        Err(FarmError::ArithmeticOverflow)
    ));
    assert_eq!(position.staked_amount, U256::zero());
    assert_eq!(totals.total_staked, math::max_total_staked());
}

#[test]
fn test_take_reward_clears_debt() {
    let mut position = account(1);
    assert!(position.settle(tokens(3), 10).is_ok());
    assert_eq!(position.last_settlement_time, 10);

    assert_eq!(position.take_reward().ok(), Some(tokens(3)));
    assert_eq!(position.reward_debt, U256::zero());
    assert!(matches!(position.take_reward(), Err(FarmError::NothingToClaim)));
}

// ==========================================
// Settlement phases
// ==========================================

#[test]
fn test_phase_happy_path() {
    let phase = SettlementPhase::default();
    let settling = phase.enter();
    assert!(matches!(settling, Ok(SettlementPhase::Settling)));

    let mutating = SettlementPhase::Settling.mutate();
    assert!(matches!(mutating, Ok(SettlementPhase::Mutating)));

    let committed = SettlementPhase::Mutating.commit();
    assert!(matches!(committed, Ok(SettlementPhase::Committed)));

    // Committed and reverted accounts accept the next call
    assert!(SettlementPhase::Committed.enter().is_ok());
    assert!(SettlementPhase::Reverted.enter().is_ok());
}

#[test]
fn test_phase_rejects_reentry() {
    assert!(matches!(
        SettlementPhase::Settling.enter(),
        Err(FarmError::ReentrancyDetected)
    ));
    assert!(matches!(
        SettlementPhase::Mutating.enter(),
        Err(FarmError::ReentrancyDetected)
    ));
}

#[test]
fn test_phase_rejects_skipped_steps() {
    assert!(matches!(
        SettlementPhase::Idle.mutate(),
        Err(FarmError::ReentrancyDetected)
    ));
    assert!(matches!(
        SettlementPhase::Settling.commit(),
        Err(FarmError::ReentrancyDetected)
    ));
    assert!(matches!(
        SettlementPhase::Mutating.revert(),
        SettlementPhase::Reverted
    ));
}

// ==========================================
// Faucet cooldown
// ==========================================

#[test]
fn test_cooldown_remaining() {
    assert_eq!(cooldown_remaining(None, 5), 0);
    assert_eq!(cooldown_remaining(Some(0), 0), FAUCET_COOLDOWN_MS);
    assert_eq!(cooldown_remaining(Some(0), FAUCET_COOLDOWN_MS - 1), 1);
    assert_eq!(cooldown_remaining(Some(0), FAUCET_COOLDOWN_MS), 0);
    assert_eq!(cooldown_remaining(Some(100), 50), FAUCET_COOLDOWN_MS);
}
