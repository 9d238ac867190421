//! Well-known account addresses.
//!
//! Decoded at compile time from the base58 constants in `stakelens-ids`,
//! the single source of truth for every address stakelens reads from.

use solana_pubkey::Pubkey;

// =============================================================================
// Adrena Accounts (imported from stakelens-ids crate)
// =============================================================================

/// Adrena program ID.
pub const ADRENA_PROGRAM_ID: Pubkey =
    Pubkey::new_from_array(five8_const::decode_32_const(stakelens_ids::ADRENA_PROGRAM_ID));

/// ADX staking account read by default.
pub const DEFAULT_STAKING_ACCOUNT: Pubkey =
    Pubkey::new_from_array(five8_const::decode_32_const(stakelens_ids::DEFAULT_STAKING_ACCOUNT));

/// USDC reward vault token account.
pub const REWARD_VAULT: Pubkey =
    Pubkey::new_from_array(five8_const::decode_32_const(stakelens_ids::REWARD_VAULT));
