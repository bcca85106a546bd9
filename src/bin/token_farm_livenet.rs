//! Livenet deploy and demo binary for the Token Farm.
//!
//! Run with:
//! - Deploy only:       TOKEN_FARM_LIVENET_MODE=deploy cargo run --bin token_farm_livenet --features=livenet
//! - Deploy + demo:     TOKEN_FARM_LIVENET_MODE=deploy_and_demo cargo run --bin token_farm_livenet --features=livenet
//! - Demo on existing:  TOKEN_FARM_LIVENET_MODE=demo TOKEN_FARM_EXISTING_FARM=... cargo run ...
//! - Query position:    TOKEN_FARM_LIVENET_MODE=query ... cargo run ...
//!
//! Required environment variables (Odra livenet):
//! - ODRA_CASPER_LIVENET_SECRET_KEY_PATH
//! - ODRA_CASPER_LIVENET_NODE_ADDRESS        (base URL; Odra appends "/rpc")
//! - ODRA_CASPER_LIVENET_EVENTS_URL
//! - ODRA_CASPER_LIVENET_CHAIN_NAME
//!
//! Optional:
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS          (motes)
//! - ODRA_CASPER_LIVENET_CALL_GAS            (motes)
//! - TOKEN_FARM_EXISTING_FARM               (64-hex or formatted "hash-..."/"contract-package-...")
//! - TOKEN_FARM_EXISTING_STAKE_TOKEN         (defaults to the farm's stake token)
//! - TOKEN_FARM_EXISTING_REWARD_TOKEN        (defaults to the farm's reward token)
//! - TOKEN_FARM_DAILY_REWARD_POOL            (whole tokens, default: 1000)
//! - TOKEN_FARM_DEMO_STAKE                   (whole tokens, default: 8)
//! - TOKEN_FARM_DEMO_UNSTAKE                 (whole tokens, default: 3)

use odra::host::{Deployer, HostEnv, HostRef, HostRefLoader, NoArgs};
use odra::prelude::*;

use token_farm::accrual::AccrualMode;
use token_farm::farm::{TokenFarm, TokenFarmHostRef, TokenFarmInitArgs};
use token_farm::math;
use token_farm::tokens::{RewardToken, RewardTokenHostRef, StakeToken, StakeTokenHostRef};

const MOTES_PER_CSPR: u64 = 1_000_000_000;

const DEFAULT_DEPLOY_GAS_MOTES: u64 = 450_000_000_000; // 450 CSPR
const DEFAULT_CALL_GAS_MOTES: u64 = 50_000_000_000; // 50 CSPR

fn main() {
    println!("============================================");
    println!("  Token Farm - Livenet");
    println!("============================================\n");

    let env = odra_casper_livenet_env::env();

    let mode = std::env::var("TOKEN_FARM_LIVENET_MODE").unwrap_or_else(|_| "deploy".to_string());
    let should_deploy = mode == "deploy" || mode == "deploy_and_demo";
    let should_demo = mode == "demo" || mode == "deploy_and_demo";
    let should_query = mode == "query";

    let deploy_gas = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS", DEFAULT_DEPLOY_GAS_MOTES);
    let call_gas = read_u64_env("ODRA_CASPER_LIVENET_CALL_GAS", DEFAULT_CALL_GAS_MOTES);

    let daily_pool_tokens = read_u64_env("TOKEN_FARM_DAILY_REWARD_POOL", 1000);
    let stake_tokens = read_u64_env("TOKEN_FARM_DEMO_STAKE", 8);
    let unstake_tokens = read_u64_env("TOKEN_FARM_DEMO_UNSTAKE", 3);

    println!("[INFO] Mode: {}", mode);
    println!("[INFO] Caller: {:?}", env.caller());
    println!(
        "[INFO] Gas (motes): deploy={} ({} CSPR), calls={} ({} CSPR)",
        deploy_gas,
        deploy_gas / MOTES_PER_CSPR,
        call_gas,
        call_gas / MOTES_PER_CSPR
    );
    println!(
        "[INFO] Params: daily_reward_pool={} tokens, demo stake={} unstake={}",
        daily_pool_tokens, stake_tokens, unstake_tokens
    );
    println!();

    // ==========================================
    // Step 1: Deploy the tokens and the farm, or load an existing farm
    // ==========================================
    let (stake_token, reward_token, farm) = if should_deploy {
        deploy_all(&env, deploy_gas, call_gas, daily_pool_tokens)
    } else {
        load_existing(&env, &mode)
    };
    let stake_token_addr = stake_token.address();
    let reward_token_addr = reward_token.address();
    println!("[INFO] Farm: {:?}", farm.address());
    println!();

    // ==========================================
    // Demo: faucet -> approve -> stake -> partial unstake
    // ==========================================
    if should_demo {
        run_demo(&env, stake_token, &farm, call_gas, stake_tokens, unstake_tokens);
    }

    if should_query {
        let caller = env.caller();
        let data = farm.get_user_staking_data(caller);
        let projection = farm.get_user_projected_rewards(caller);
        println!(
            "TOKEN_FARM_POSITION_JSON={{\"staked\":\"{}\",\"is_staking\":{},\"pending_reward\":\"{}\",\"last_settlement_time\":{},\"daily_reward\":\"{}\",\"monthly_reward\":\"{}\",\"annual_reward\":\"{}\",\"share_permil\":{},\"user\":\"{:?}\"}}",
            data.staked_amount,
            data.is_staking,
            data.pending_reward,
            data.last_settlement_time,
            projection.daily_reward,
            projection.monthly_reward,
            projection.annual_reward,
            projection.share_permil,
            caller
        );
        return;
    }

    if should_deploy {
        output_deploy_json(stake_token_addr, reward_token_addr, farm.address());
    }
}

fn deploy_all(
    env: &HostEnv,
    deploy_gas: u64,
    call_gas: u64,
    daily_pool_tokens: u64,
) -> (StakeTokenHostRef, RewardTokenHostRef, TokenFarmHostRef) {
    println!("[STEP 1] Deploying stake and reward tokens...");
    env.set_gas(deploy_gas);
    let stake_token = StakeToken::deploy(env, NoArgs);
    println!("[OK] {} deployed at: {:?}", stake_token.symbol(), stake_token.address());
    env.set_gas(deploy_gas);
    let mut reward_token = RewardToken::deploy(env, NoArgs);
    println!("[OK] {} deployed at: {:?}", reward_token.symbol(), reward_token.address());
    println!();

    println!("[STEP 2] Deploying Token Farm...");
    env.set_gas(deploy_gas);
    let farm = TokenFarm::deploy(
        env,
        TokenFarmInitArgs {
            stake_token: stake_token.address(),
            reward_token: reward_token.address(),
            daily_reward_pool: math::tokens(daily_pool_tokens),
            accrual_mode: AccrualMode::Proportional,
        },
    );
    println!("[OK] Token Farm deployed at: {:?}", farm.address());

    let supply = reward_token.balance_of(env.caller());
    env.set_gas(call_gas);
    reward_token.transfer(farm.address(), supply);
    println!("[OK] Funded farm with {} reward wad", supply);
    println!();

    (stake_token, reward_token, farm)
}

/// Load the farm from TOKEN_FARM_EXISTING_FARM. Token addresses come from the
/// farm unless overridden by TOKEN_FARM_EXISTING_STAKE_TOKEN / _REWARD_TOKEN.
fn load_existing(
    env: &HostEnv,
    mode: &str,
) -> (StakeTokenHostRef, RewardTokenHostRef, TokenFarmHostRef) {
    println!("[STEP 1] Reusing existing Token Farm...");
    let farm_addr = existing_address("TOKEN_FARM_EXISTING_FARM", mode);
    let farm = TokenFarm::load(env, farm_addr);
    println!("[OK] Token Farm: {:?}", farm_addr);

    let stake_addr = optional_address("TOKEN_FARM_EXISTING_STAKE_TOKEN")
        .or_else(|| farm.stake_token())
        .unwrap_or_else(|| panic!("[FATAL] farm has no stake token"));
    let reward_addr = optional_address("TOKEN_FARM_EXISTING_REWARD_TOKEN")
        .or_else(|| farm.reward_token())
        .unwrap_or_else(|| panic!("[FATAL] farm has no reward token"));
    println!("[OK] stake token: {:?}", stake_addr);
    println!("[OK] reward token: {:?}", reward_addr);
    println!();

    (
        StakeToken::load(env, stake_addr),
        RewardToken::load(env, reward_addr),
        farm,
    )
}

fn run_demo(
    env: &HostEnv,
    stake_token: StakeTokenHostRef,
    farm: &TokenFarmHostRef,
    call_gas: u64,
    stake_tokens: u64,
    unstake_tokens: u64,
) {
    let caller = env.caller();
    let mut stake_token = stake_token;
    let mut farm = TokenFarmHostRef::new(farm.address(), env.clone());

    let wait = stake_token.faucet_cooldown_remaining(caller);
    if wait == 0 {
        println!("[DEMO 1] Claiming faucet...");
        env.set_gas(call_gas);
        stake_token.faucet();
        println!("[OK] Faucet claimed. Balance: {}", stake_token.balance_of(caller));
    } else {
        println!("[SKIP] Faucet cooling down for another {} s.", wait / 1000);
    }

    let stake_amount = math::tokens(stake_tokens);
    println!("[DEMO 2] Approving and staking {} tokens...", stake_tokens);
    env.set_gas(call_gas);
    stake_token.approve(farm.address(), stake_amount);
    env.set_gas(call_gas);
    farm.stake_tokens(stake_amount);
    println!("[OK] Stake complete.");
    print_position_info(&farm, caller);

    if unstake_tokens > 0 {
        println!("[DEMO 3] Unstaking {} tokens...", unstake_tokens);
        env.set_gas(call_gas);
        farm.unstake_tokens(math::tokens(unstake_tokens));
        println!("[OK] Unstake complete.");
        print_position_info(&farm, caller);
    }
}

fn print_position_info(farm: &TokenFarmHostRef, user: Address) {
    let data = farm.get_user_staking_data(user);
    let projection = farm.get_user_projected_rewards(user);
    let stats = farm.get_pool_stats();
    println!("     staked: {} wad", data.staked_amount);
    println!("     is_staking: {}", data.is_staking);
    println!("     pending_reward: {} wad", data.pending_reward);
    println!("     daily_reward: {} wad", projection.daily_reward);
    println!(
        "     share: {} / 10000 ({}%)",
        projection.share_permil,
        projection.share_permil as f64 / 100.0
    );
    println!("     total_staked: {}", stats.total_staked);
    println!("     daily_reward_pool: {}", stats.daily_reward_pool);
    println!("     implied_annual_pool: {}", stats.implied_annual_pool);
    println!();
}

fn existing_address(var: &str, mode: &str) -> Address {
    optional_address(var).unwrap_or_else(|| panic!("{} must be set for mode={}", var, mode))
}

fn optional_address(var: &str) -> Option<Address> {
    std::env::var(var)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_contract_address(&raw))
}

fn read_u64_env(name: &str, default_value: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => {
            let cleaned = raw.trim().replace('_', "");
            cleaned.parse::<u64>().unwrap_or(default_value)
        }
        Err(_) => default_value,
    }
}

fn output_deploy_json(stake_token_addr: Address, reward_token_addr: Address, farm_addr: Address) {
    let chain_name = std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME")
        .unwrap_or_else(|_| "casper-test".to_string());
    let node_url = std::env::var("ODRA_CASPER_LIVENET_NODE_ADDRESS")
        .unwrap_or_else(|_| "https://node.testnet.casper.network".to_string());

    println!(
        r#"TOKEN_FARM_DEPLOY_JSON={{"chain_name":"{}","node_url":"{}","stake_token_contract_hash":"{}","reward_token_contract_hash":"{}","farm_contract_hash":"{}","deployed_at":"{}"}}"#,
        chain_name,
        node_url,
        format_address_hash(&stake_token_addr),
        format_address_hash(&reward_token_addr),
        format_address_hash(&farm_addr),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}

fn format_address_hash(addr: &Address) -> String {
    let debug_str = format!("{:?}", addr);
    let (Some(start), Some(end)) = (debug_str.find('['), debug_str.rfind(']')) else {
        return debug_str;
    };
    debug_str[start + 1..end]
        .split(", ")
        .filter_map(|part| part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")))
        .collect()
}

fn parse_contract_address(raw: &str) -> Address {
    use odra::casper_types::account::AccountHash;
    use odra::casper_types::contracts::ContractPackageHash;

    fn decode_hex_32(s: &str) -> [u8; 32] {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            panic!("Invalid address hash (expected 64 hex): {}", s);
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .unwrap_or_else(|_| panic!("Invalid hex in address: {}", s));
        }
        out
    }

    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix("account-hash-") {
        return Address::Account(AccountHash::new(decode_hex_32(hex)));
    }
    let hex = ["contract-package-", "package-", "hash-"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    Address::Contract(ContractPackageHash::new(decode_hex_32(hex)))
}
