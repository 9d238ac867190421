//! Explicit TTL caching.
//!
//! There is no process-wide cache. A [`TtlCache`] is created by the caller and
//! shared by handle (`Arc`) with whatever should reuse its entries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::{GatewayError, PriceFeed, PriceQuote};

/// A map whose entries expire `ttl` after insertion.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    /// Store `value`, replacing any previous entry.
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        // expired entries are dropped on write so the map stays bounded by live keys
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), value));
    }

    /// Drop the entry for `key`.
    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }
}

/// A [`PriceFeed`] that serves quotes from a shared [`TtlCache`].
///
/// Only successful quotes are cached; failures always reach the inner feed
/// again on the next call.
pub struct CachedPriceFeed<F> {
    inner: F,
    cache: Arc<TtlCache<String, PriceQuote>>,
}

impl<F: PriceFeed> CachedPriceFeed<F> {
    /// Wrap `inner` with `cache`.
    pub fn new(inner: F, cache: Arc<TtlCache<String, PriceQuote>>) -> Self {
        Self { inner, cache }
    }

    /// The shared cache handle.
    pub fn cache(&self) -> &Arc<TtlCache<String, PriceQuote>> {
        &self.cache
    }
}

#[async_trait]
impl<F: PriceFeed> PriceFeed for CachedPriceFeed<F> {
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote, GatewayError> {
        let key = symbol.to_string();
        if let Some(quote) = self.cache.get(&key).await {
            debug!(symbol, "price cache hit");
            return Ok(quote);
        }
        let quote = self.inner.latest_price(symbol).await?;
        self.cache.insert(key, quote.clone()).await;
        Ok(quote)
    }
}
