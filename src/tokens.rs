//! CEP-18 Token implementations: stake asset (mDAI) and reward asset (DAPP)
//!
//! - StakeToken: token users stake in the farm, with a cooldown-gated faucet
//! - RewardToken: fixed-supply token the farm pays rewards in

use alloc::string::String;
use odra::casper_types::U256;
use odra::prelude::*;
use odra_modules::cep18::events::{
    Burn, DecreaseAllowance, IncreaseAllowance, Mint, SetAllowance, Transfer, TransferFrom,
};
use odra_modules::cep18_token::Cep18;

use crate::faucet::{Faucet, FaucetError};
use crate::math;

/// Supply minted to the deployer of either token (1,000,000 tokens).
pub const INITIAL_SUPPLY_TOKENS: u64 = 1_000_000;
pub const TOKEN_DECIMALS: u8 = 18;

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct FaucetClaimed {
        pub recipient: Address,
        pub amount: U256,
        pub next_claim_at: u64,
    }
}

/// StakeToken: mock stablecoin staked in the farm.
/// Anyone can call faucet once per cooldown period to get test tokens.
#[odra::module(
    events = [
        Mint,
        Burn,
        SetAllowance,
        IncreaseAllowance,
        DecreaseAllowance,
        Transfer,
        TransferFrom,
        events::FaucetClaimed
    ],
    errors = FaucetError
)]
pub struct StakeToken {
    token: SubModule<Cep18>,
    faucet: SubModule<Faucet>,
}

#[odra::module]
impl StakeToken {
    /// Initialize the token; the caller receives the initial supply
    pub fn init(&mut self) {
        self.token.init(
            "mDAI".to_string(),
            "Mock DAI Token".to_string(),
            TOKEN_DECIMALS,
            math::tokens(INITIAL_SUPPLY_TOKENS),
        );
    }

    /// Token name
    pub fn name(&self) -> String {
        self.token.name()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    /// Token decimals
    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    /// Total supply
    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    /// Balance of an address
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    /// Allowance from owner to spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    /// Transfer tokens
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    /// Approve spender
    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn increase_allowance(&mut self, spender: Address, amount: U256) {
        self.token.increase_allowance(&spender, &amount);
    }

    pub fn decrease_allowance(&mut self, spender: Address, amount: U256) {
        self.token.decrease_allowance(&spender, &amount);
    }

    /// Transfer from (with allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    /// Mint the faucet amount to the caller.
    /// Reverts with `CooldownActive` until 24h have passed since the caller's last claim.
    pub fn faucet(&mut self) {
        let caller = self.env().caller();
        let now = self.env().get_block_time();
        let amount = match self.faucet.claim(&caller, now) {
            Ok(amount) => amount,
            Err(error) => self.env().revert(error),
        };
        self.token.raw_mint(&caller, &amount);
        self.env().emit_event(events::FaucetClaimed {
            recipient: caller,
            amount,
            next_claim_at: now.saturating_add(crate::faucet::FAUCET_COOLDOWN_MS),
        });
    }

    /// Block time (ms) of the account's last faucet claim
    pub fn last_faucet_claim(&self, account: Address) -> Option<u64> {
        self.faucet.last_claim(&account)
    }

    /// Milliseconds until the account may claim again (0 = claimable now)
    pub fn faucet_cooldown_remaining(&self, account: Address) -> u64 {
        self.faucet.remaining(&account, self.env().get_block_time())
    }
}

/// RewardToken: reward asset paid out by the farm.
/// The whole supply is minted to the deployer, who funds the farm with it.
#[odra::module(
    events = [
        Mint,
        Burn,
        SetAllowance,
        IncreaseAllowance,
        DecreaseAllowance,
        Transfer,
        TransferFrom
    ]
)]
pub struct RewardToken {
    token: SubModule<Cep18>,
}

#[odra::module]
impl RewardToken {
    pub fn init(&mut self) {
        self.token.init(
            "DAPP".to_string(),
            "DApp Token".to_string(),
            TOKEN_DECIMALS,
            math::tokens(INITIAL_SUPPLY_TOKENS),
        );
    }

    pub fn name(&self) -> String {
        self.token.name()
    }

    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }
}
