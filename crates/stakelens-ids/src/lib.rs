//! Single source of truth for the addresses and endpoints stakelens reads from.
//!
//! Addresses are `&'static str` base58 constants so they can be decoded at
//! compile time (`five8_const::decode_32_const`) or parsed at runtime.
//!
//! # Feature Flags
//!
//! - `mainnet` - Use mainnet RPC endpoints (default)
//! - `devnet` - Use devnet RPC endpoints
//! - `localnet` - Use a local validator as primary, mainnet as fallback
//!
//! The Adrena program and its accounts only exist on mainnet, so the account
//! constants do not change with the network feature. Only the RPC endpoints do.
//!
//! # Usage
//!
//! ```rust
//! let primary = stakelens_ids::PRIMARY_RPC_URL;
//! assert!(primary.starts_with("http"));
//! ```

#![no_std]

// =============================================================================
// Adrena Program Accounts
// =============================================================================

/// Adrena program ID.
///
/// Owner of the staking accounts decoded by the built-in layouts.
pub const ADRENA_PROGRAM_ID: &str = "13gDzEXCdocbj8iAiqrScGo47NiSuYENGsRqi3SEAwet";

/// ADX staking account read when the caller does not name one.
pub const DEFAULT_STAKING_ACCOUNT: &str = "5Feq2MKbimA44dqgFHLWr7h77xAqY9cet5zn9eMCj78p";

/// USDC reward vault token account.
///
/// Its balance minus the resolved reward amount of a staking account is the
/// pending reward reported in the staking summary.
pub const REWARD_VAULT: &str = "A3UJxhPtieUr1mjgJhJaTPqDReDaB2H9q7hzs2icrUeS";

// =============================================================================
// Price Service
// =============================================================================

/// Last-price endpoint returning `{success, data: {symbol: {price, price_timestamp}}}`.
pub const PRICE_API_URL: &str = "https://datapi.adrena.xyz/last-price";

// =============================================================================
// RPC Endpoints
// =============================================================================

/// Primary RPC endpoint (devnet).
#[cfg(feature = "devnet")]
pub const PRIMARY_RPC_URL: &str = "https://api.devnet.solana.com";

/// Primary RPC endpoint (localnet).
#[cfg(all(feature = "localnet", not(feature = "devnet")))]
pub const PRIMARY_RPC_URL: &str = "http://127.0.0.1:8899";

/// Primary RPC endpoint (mainnet).
#[cfg(not(any(feature = "devnet", feature = "localnet")))]
pub const PRIMARY_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Fallback RPC endpoint (devnet).
///
/// Tried once when the primary endpoint fails its liveness probe.
#[cfg(feature = "devnet")]
pub const FALLBACK_RPC_URL: &str = "https://solana-devnet.g.alchemy.com/v2/demo";

/// Fallback RPC endpoint (mainnet/localnet).
///
/// Tried once when the primary endpoint fails its liveness probe.
#[cfg(not(feature = "devnet"))]
pub const FALLBACK_RPC_URL: &str = "https://solana-mainnet.g.alchemy.com/v2/demo";

// =============================================================================
// Token Conventions
// =============================================================================

/// Decimal precision assumed for token amounts when nothing better is known.
///
/// Matches the SPL convention used by ADX, ALP and USDC.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Decimal places of SOL (1 SOL = 10^9 lamports).
pub const SOL_DECIMALS: u8 = 9;
