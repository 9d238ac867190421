//! Stakelens
//!
//! Reads a Solana account, decodes it against the registered layouts and,
//! for Adrena staking accounts, builds a financial summary from on-chain
//! balances and the token price.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      StakeLens (reader)                      │
//! │  • Source selection with one fallback                        │
//! │  • First-match layout resolution                             │
//! │  • Classification of integer leaves                          │
//! └─────────────────────────────────────────────────────────────┘
//!               │                           │
//!               ▼                           ▼
//! ┌─────────────────────────┐   ┌─────────────────────────┐
//! │      LedgerSource       │   │        PriceFeed        │
//! │  • Account data         │   │  • Last price (adx/alp) │
//! │  • Token balances       │   │  • Optional TTL cache   │
//! │  • Mint supply          │   │                         │
//! └─────────────────────────┘   └─────────────────────────┘
//! ```
//!
//! # Failure Model
//!
//! Source selection and decoding failures abort the read. Failures of the
//! three summary lookups (supply, vault balance, price) never do; the
//! affected figures degrade to [`UNKNOWN`] or [`ERROR_CALCULATING`].
//!
//! # Modules
//!
//! - [`addresses`]: well-known Adrena addresses as [`Pubkey`](solana_pubkey::Pubkey)s
//! - `gateway`: [`LedgerSource`] and [`PriceFeed`] seams
//! - `rpc` / `price`: production implementations
//! - `cache`: [`TtlCache`] and [`CachedPriceFeed`]
//! - `fallback`: [`FallbackController`]
//! - `summary`: [`SummaryBuilder`] and [`StakingSummary`]
//! - `reader`: [`StakeLens::read_account`]
//! - `config`: [`ReaderConfig`]

pub mod addresses;
mod cache;
mod cancel;
mod config;
mod error;
mod fallback;
mod gateway;
mod price;
mod reader;
mod report;
mod rpc;
mod summary;
mod types;

pub use addresses::*;
pub use cache::*;
pub use config::*;
pub use error::*;
pub use fallback::*;
pub use gateway::*;
pub use price::*;
pub use reader::*;
pub use report::*;
pub use rpc::*;
pub use summary::*;
pub use types::*;

pub use stakelens_layout as layout;
pub use stakelens_numeric as numeric;
pub use tokio_util::sync::CancellationToken;
