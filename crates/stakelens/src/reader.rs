//! Pipeline entry point.
//!
//! ```text
//! address ──► FallbackController ──► account_info ──► CandidateResolver
//!                                                          │
//!   AccountReport ◄── SummaryBuilder ◄── Classifier ◄──────┘
//! ```

use core::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use solana_pubkey::Pubkey;
use stakelens_layout::{CandidateResolver, Classifier, SchemaRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cancel::guarded;
use crate::{
    AccountReport, BasicInfo, CachedPriceFeed, ConfigError, DEFAULT_STAKING_ACCOUNT,
    FallbackController, HttpPriceFeed, LedgerSource, PriceFeed, ReadError, ReaderConfig,
    RpcLedger, SummaryBuilder, TtlCache,
};

/// Reads and summarizes accounts.
///
/// Holds no per-request state; one reader can serve concurrent requests.
pub struct StakeLens {
    registry: SchemaRegistry,
    classifier: Classifier,
    sources: FallbackController,
    prices: Arc<dyn PriceFeed>,
    summaries: SummaryBuilder,
}

impl StakeLens {
    /// Assemble a reader from its parts.
    pub fn new(
        registry: SchemaRegistry,
        sources: FallbackController,
        prices: Arc<dyn PriceFeed>,
        summaries: SummaryBuilder,
    ) -> Self {
        Self {
            registry,
            classifier: Classifier::default(),
            sources,
            prices,
            summaries,
        }
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Reader over the layouts, live RPC endpoints and HTTP price feed
    /// described by `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the reward vault is not a valid address, the IDL
    /// cannot be loaded or the HTTP client cannot be built.
    pub fn from_config(config: &ReaderConfig) -> Result<Self, ConfigError> {
        let timeout = config.request_timeout();
        let reward_vault = config.reward_vault_pubkey()?;

        let sources = FallbackController::new(
            Arc::new(RpcLedger::new(&config.primary_rpc_url, timeout)),
            Arc::new(RpcLedger::new(&config.fallback_rpc_url, timeout)),
        );

        let feed = HttpPriceFeed::new(&config.price_api_url, timeout)?;
        let prices = price_feed(feed, config.price_cache_ttl());

        let summaries = SummaryBuilder::new(reward_vault)
            .with_staking_layouts(config.staking_layouts.iter().cloned());

        Ok(Self::new(config.registry()?, sources, prices, summaries)
            .with_classifier(Classifier::with_amount_decimals(config.token_amount_decimals)))
    }

    /// The layouts this reader tries, in order.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Read the ADX staking account at [`DEFAULT_STAKING_ACCOUNT`].
    ///
    /// # Errors
    ///
    /// As [`read_account`](Self::read_account).
    pub async fn read_default_staking(
        &self,
        source_override: Option<Arc<dyn LedgerSource>>,
        cancel: &CancellationToken,
    ) -> Result<AccountReport, ReadError> {
        self.read_account(&DEFAULT_STAKING_ACCOUNT.to_string(), source_override, cancel)
            .await
    }

    /// Read, decode, classify and summarize the account at `address`.
    ///
    /// `source_override` takes the primary source's place for this request;
    /// the fallback still applies if it is down.
    ///
    /// # Errors
    ///
    /// - [`ReadError::InvalidAddress`] if `address` is not base58
    /// - [`ReadError::SourceUnavailable`] if no source passes its probe
    /// - [`ReadError::Fetch`] / [`ReadError::AccountNotFound`] if the account
    ///   cannot be read
    /// - [`ReadError::NoMatch`] if no layout decodes the data
    /// - [`ReadError::MissingField`] if a staking layout lacks a summary field
    /// - [`ReadError::Cancelled`] if `cancel` fires at any point
    pub async fn read_account(
        &self,
        address: &str,
        source_override: Option<Arc<dyn LedgerSource>>,
        cancel: &CancellationToken,
    ) -> Result<AccountReport, ReadError> {
        let key = Pubkey::from_str(address.trim())
            .map_err(|_| ReadError::InvalidAddress(address.to_string()))?;

        let sources = match source_override {
            Some(source) => {
                info!(source = %source.label(), "using source override");
                self.sources.with_primary(source)
            }
            None => self.sources.clone(),
        };
        let active = sources.acquire(cancel).await?;
        let ledger = active.source.as_ref();

        let account = guarded(cancel, ledger.account_info(&key))
            .await?
            .map_err(ReadError::Fetch)?
            .ok_or_else(|| ReadError::AccountNotFound(key.to_string()))?;
        debug!(
            address = %key,
            owner = %account.owner,
            len = account.data.len(),
            "account fetched"
        );

        let resolution = CandidateResolver::new(&self.registry)
            .resolve(&account.data)
            .inspect_err(|err| {
                for attempt in &err.attempts {
                    warn!(
                        address = %key,
                        layout = %attempt.layout,
                        error = attempt.error.name(),
                        reason = %attempt.error,
                        "layout rejected"
                    );
                }
            })?;
        info!(
            address = %key,
            layout = %resolution.layout,
            rejected = resolution.attempts.len(),
            "account decoded"
        );

        let processed = self.classifier.classify(&resolution.value);
        let summary = self
            .summaries
            .build(
                &processed,
                &resolution.layout,
                ledger,
                self.prices.as_ref(),
                cancel,
            )
            .await?;

        // a summary completed after cancellation is discarded
        if cancel.is_cancelled() {
            return Err(ReadError::Cancelled);
        }

        Ok(AccountReport {
            basic_info: BasicInfo::new(&key, &account.owner, account.lamports),
            account_type: resolution.layout,
            available_account_types: self.registry.layout_names(),
            processed_account: processed,
            summary,
            attempts: resolution.attempts,
            role: active.role,
        })
    }
}

/// `feed` behind a quote cache, or bare if `ttl` is `None`.
fn price_feed<F>(feed: F, ttl: Option<Duration>) -> Arc<dyn PriceFeed>
where
    F: PriceFeed + 'static,
{
    match ttl {
        Some(ttl) => Arc::new(CachedPriceFeed::new(feed, Arc::new(TtlCache::new(ttl)))),
        None => Arc::new(feed),
    }
}
