//! Scripted ledger and price feed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use stakelens::numeric::{TokenAmount, parse_decimal};
use stakelens::{AccountInfo, GatewayError, LedgerSource, PriceFeed, PriceQuote};

/// In-memory ledger with a scripted probe outcome.
pub struct MockLedger {
    label: String,
    probe: Result<(), GatewayError>,
    accounts: HashMap<Pubkey, AccountInfo>,
    balances: HashMap<Pubkey, Result<TokenAmount, GatewayError>>,
    supplies: HashMap<Pubkey, Result<TokenAmount, GatewayError>>,
    delay: Option<Duration>,
    probes: AtomicUsize,
    account_reads: AtomicUsize,
}

impl MockLedger {
    /// A live ledger with no accounts.
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            probe: Ok(()),
            accounts: HashMap::new(),
            balances: HashMap::new(),
            supplies: HashMap::new(),
            delay: None,
            probes: AtomicUsize::new(0),
            account_reads: AtomicUsize::new(0),
        }
    }

    /// A ledger whose probe fails with a connection error.
    pub fn down(label: &str) -> Self {
        Self::new(label).with_probe(Err(GatewayError::unavailable(
            label,
            "error sending request: Connection refused (os error 111)",
        )))
    }

    pub fn with_probe(mut self, probe: Result<(), GatewayError>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_account(mut self, address: Pubkey, owner: Pubkey, lamports: u64, data: Vec<u8>) -> Self {
        self.accounts.insert(address, AccountInfo { owner, lamports, data });
        self
    }

    pub fn with_balance(mut self, account: Pubkey, balance: Result<TokenAmount, GatewayError>) -> Self {
        self.balances.insert(account, balance);
        self
    }

    pub fn with_supply(mut self, mint: Pubkey, supply: Result<TokenAmount, GatewayError>) -> Self {
        self.supplies.insert(mint, supply);
        self
    }

    /// Delay every token lookup by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn not_found(what: String) -> GatewayError {
    GatewayError::NotFound { what }
}

#[async_trait]
impl LedgerSource for MockLedger {
    fn label(&self) -> &str {
        &self.label
    }

    async fn probe(&self) -> Result<(), GatewayError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probe.clone()
    }

    async fn account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>, GatewayError> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.get(address).cloned())
    }

    async fn token_account_balance(&self, address: &Pubkey) -> Result<TokenAmount, GatewayError> {
        self.pause().await;
        self.balances
            .get(address)
            .cloned()
            .unwrap_or_else(|| Err(not_found(format!("token account {address}"))))
    }

    async fn token_supply(&self, mint: &Pubkey) -> Result<TokenAmount, GatewayError> {
        self.pause().await;
        self.supplies
            .get(mint)
            .cloned()
            .unwrap_or_else(|| Err(not_found(format!("mint {mint}"))))
    }
}

/// Fixed quotes by symbol; unknown symbols are unavailable.
#[derive(Default)]
pub struct MockPriceFeed {
    quotes: HashMap<String, PriceQuote>,
    calls: AtomicUsize,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: &str) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            PriceQuote {
                price: parse_decimal(price).unwrap(),
                as_of: PRICE_TIMESTAMP.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub const PRICE_TIMESTAMP: &str = "2025-01-02T03:04:05.000Z";

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| GatewayError::unavailable("mock-price", "connection reset by peer"))
    }
}
