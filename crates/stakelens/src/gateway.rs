//! Remote data interfaces.
//!
//! Two seams: [`LedgerSource`] for on-chain reads and [`PriceFeed`] for token
//! prices. Production implementations live in [`rpc`](crate::RpcLedger) and
//! [`price`](crate::HttpPriceFeed); tests swap in scripted mocks.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use solana_pubkey::Pubkey;
use stakelens_numeric::TokenAmount;

use crate::GatewayError;

/// Raw account as returned by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    /// Owning program
    pub owner: Pubkey,
    /// Balance in lamports
    pub lamports: u64,
    /// Account data
    pub data: Vec<u8>,
}

/// A token price with the time the service quoted it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    /// USD price
    pub price: BigDecimal,
    /// Quote time as reported by the service
    pub as_of: String,
}

/// Read access to a Solana ledger.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Human-readable label for logs and errors (usually the endpoint URL).
    fn label(&self) -> &str;

    /// Liveness probe (`getLatestBlockhash`).
    async fn probe(&self) -> Result<(), GatewayError>;

    /// Fetch an account; `Ok(None)` if it does not exist.
    async fn account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>, GatewayError>;

    /// Balance of an SPL token account.
    async fn token_account_balance(&self, address: &Pubkey) -> Result<TokenAmount, GatewayError>;

    /// Total supply of an SPL mint.
    async fn token_supply(&self, mint: &Pubkey) -> Result<TokenAmount, GatewayError>;
}

/// Source of token prices.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Latest quote for `symbol` (`"adx"`, `"alp"`).
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote, GatewayError>;
}
