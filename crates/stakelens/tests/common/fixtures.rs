//! Staking account fixtures and reader setup.

use std::sync::Arc;

use borsh::BorshSerialize;
use solana_pubkey::Pubkey;
use stakelens::layout::{SchemaRegistry, account_discriminator, adrena_registry};
use stakelens::{ADRENA_PROGRAM_ID, FallbackController, PriceFeed, StakeLens, SummaryBuilder};

use super::{MockLedger, MockPriceFeed};

/// Staked token mint used by the fixtures.
pub const STAKED_MINT: Pubkey = Pubkey::new_from_array([3; 32]);

/// Reward vault used by the fixtures.
pub const VAULT: Pubkey = Pubkey::new_from_array([4; 32]);

/// Address of the fixture staking account.
pub const STAKING_ADDRESS: Pubkey = Pubkey::new_from_array([5; 32]);

/// Lamports held by the fixture staking account.
pub const STAKING_LAMPORTS: u64 = 2_039_280;

#[derive(BorshSerialize, Clone, Copy, Default)]
pub struct StakingRound {
    pub start_time: i64,
    pub end_time: i64,
    pub rate: u64,
    pub total_stake: u64,
    pub total_claim: u64,
    pub lm_rate: u64,
    pub lm_total_stake: u64,
    pub lm_total_claim: u64,
}

/// On-chain `Staking` account, field for field.
#[derive(BorshSerialize, Clone)]
pub struct StakingAccount {
    pub discriminator: [u8; 8],
    pub bump: u8,
    pub staked_token_decimals: u8,
    pub staking_type: u8,
    pub reward_token_vault_bump: u8,
    pub lm_reward_token_vault_bump: u8,
    pub staked_token_vault_bump: u8,
    pub initialized: u8,
    pub padding: [u8; 1],
    pub nb_locked_tokens: u64,
    pub nb_liquid_tokens: u64,
    pub staked_token_mint: [u8; 32],
    pub resolved_reward_token_amount: u64,
    pub resolved_staked_token_amount: u64,
    pub resolved_lm_reward_token_amount: u64,
    pub resolved_lm_staked_token_amount: u64,
    pub current_staking_round: StakingRound,
    pub next_staking_round: StakingRound,
    pub resolved_staking_rounds: [StakingRound; 32],
    pub registered_resolved_staking_round_count: u8,
    pub padding2: [u8; 7],
}

impl Default for StakingAccount {
    /// ADX staking: 100 locked, 150 liquid, 2 USDC of rewards resolved.
    fn default() -> Self {
        Self {
            discriminator: account_discriminator("Staking"),
            bump: 255,
            staked_token_decimals: 6,
            staking_type: 1,
            reward_token_vault_bump: 254,
            lm_reward_token_vault_bump: 253,
            staked_token_vault_bump: 252,
            initialized: 1,
            padding: [0],
            nb_locked_tokens: 100_000_000,
            nb_liquid_tokens: 150_000_000,
            staked_token_mint: STAKED_MINT.to_bytes(),
            resolved_reward_token_amount: 2_000_000,
            resolved_staked_token_amount: 0,
            resolved_lm_reward_token_amount: 7_500_000,
            resolved_lm_staked_token_amount: 0,
            current_staking_round: StakingRound {
                start_time: 1_735_787_045,
                end_time: 1_735_808_645,
                rate: 42,
                total_stake: 250_000_000,
                total_claim: 1_000_000,
                lm_rate: 7,
                lm_total_stake: 250_000_000,
                lm_total_claim: 0,
            },
            next_staking_round: StakingRound::default(),
            resolved_staking_rounds: [StakingRound::default(); 32],
            registered_resolved_staking_round_count: 0,
            padding2: [0; 7],
        }
    }
}

impl StakingAccount {
    pub fn bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap()
    }
}

/// A live ledger holding the default staking account, 1000 tokens of supply
/// and 5 USDC in the vault.
pub fn healthy_ledger(label: &str, account: &StakingAccount) -> MockLedger {
    use stakelens::numeric::TokenAmount;

    MockLedger::new(label)
        .with_account(STAKING_ADDRESS, ADRENA_PROGRAM_ID, STAKING_LAMPORTS, account.bytes())
        .with_supply(STAKED_MINT, Ok(TokenAmount::from_u64(1_000_000_000, 6)))
        .with_balance(VAULT, Ok(TokenAmount::from_u64(5_000_000, 6)))
}

/// ADX at 0.1, ALP at 1.5.
pub fn prices() -> MockPriceFeed {
    MockPriceFeed::new().with_price("adx", "0.1").with_price("alp", "1.5")
}

/// Reader over `registry` with the fixture vault.
pub fn reader_with(
    registry: SchemaRegistry,
    primary: Arc<MockLedger>,
    fallback: Arc<MockLedger>,
    prices: Arc<dyn PriceFeed>,
) -> StakeLens {
    StakeLens::new(
        registry,
        FallbackController::new(primary, fallback),
        prices,
        SummaryBuilder::new(VAULT),
    )
}

/// Reader over the built-in layouts with the fixture vault.
pub fn reader(primary: Arc<MockLedger>, fallback: Arc<MockLedger>, prices: Arc<dyn PriceFeed>) -> StakeLens {
    reader_with(adrena_registry().unwrap(), primary, fallback, prices)
}
