//! Stake token faucet tests

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};

use token_farm::faucet::{FaucetError, FAUCET_COOLDOWN_MS};
use token_farm::math::tokens;
use token_farm::tokens::StakeToken;

const ONE_HOUR_MS: u64 = 3_600_000;

#[test]
fn test_faucet_credits_ten_tokens() {
    let env = odra_test::env();
    env.set_caller(env.get_account(0));
    let mut stake_token = StakeToken::deploy(&env, NoArgs);
    let user = env.get_account(1);
    let supply_before = stake_token.total_supply();

    env.set_caller(user);
    stake_token.faucet();

    assert_eq!(stake_token.balance_of(user), tokens(10));
    assert_eq!(stake_token.total_supply(), supply_before + tokens(10));
    assert!(stake_token.last_faucet_claim(user).is_some());
    assert_eq!(stake_token.faucet_cooldown_remaining(user), FAUCET_COOLDOWN_MS);
}

#[test]
fn test_faucet_cooldown() {
    let env = odra_test::env();
    let mut stake_token = StakeToken::deploy(&env, NoArgs);
    let user = env.get_account(1);

    env.set_caller(user);
    stake_token.faucet();

    env.advance_block_time(23 * ONE_HOUR_MS);
    assert_eq!(
        stake_token.try_faucet(),
        Err(FaucetError::CooldownActive.into())
    );
    assert_eq!(stake_token.faucet_cooldown_remaining(user), ONE_HOUR_MS);
    assert_eq!(stake_token.balance_of(user), tokens(10));

    env.advance_block_time(ONE_HOUR_MS);
    assert_eq!(stake_token.faucet_cooldown_remaining(user), 0);
    stake_token.faucet();
    assert_eq!(stake_token.balance_of(user), tokens(20));
}

#[test]
fn test_faucet_cooldown_is_per_account() {
    let env = odra_test::env();
    let mut stake_token = StakeToken::deploy(&env, NoArgs);
    let alice = env.get_account(1);
    let bob = env.get_account(2);

    env.set_caller(alice);
    stake_token.faucet();

    env.set_caller(bob);
    assert_eq!(stake_token.last_faucet_claim(bob), None);
    assert_eq!(stake_token.faucet_cooldown_remaining(bob), 0);
    stake_token.faucet();

    assert_eq!(stake_token.balance_of(alice), tokens(10));
    assert_eq!(stake_token.balance_of(bob), tokens(10));
}

#[test]
#[should_panic(expected = "CooldownActive")]
fn test_second_faucet_claim_same_day_reverts() {
    let env = odra_test::env();
    let mut stake_token = StakeToken::deploy(&env, NoArgs);

    env.set_caller(env.get_account(3));
    stake_token.faucet();
    stake_token.faucet();
}

#[test]
fn test_failed_faucet_claim_does_not_move_cooldown() {
    let env = odra_test::env();
    let mut stake_token = StakeToken::deploy(&env, NoArgs);
    let user = env.get_account(1);

    env.set_caller(user);
    stake_token.faucet();
    let first_claim = stake_token.last_faucet_claim(user);

    env.advance_block_time(ONE_HOUR_MS);
    assert!(stake_token.try_faucet().is_err());
    assert_eq!(stake_token.last_faucet_claim(user), first_claim);
    assert_eq!(stake_token.total_supply(), tokens(1_000_000) + tokens(10));
    assert_eq!(stake_token.balance_of(env.get_account(4)), U256::zero());
}
