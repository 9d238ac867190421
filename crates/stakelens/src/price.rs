//! [`PriceFeed`] over the Adrena last-price HTTP endpoint.
//!
//! The endpoint answers
//!
//! ```text
//! {"success": true, "data": {"adx": {"price": "0.0412", "price_timestamp": "..."}, "alp": {...}}}
//! ```
//!
//! Prices may arrive as JSON strings or numbers. Both are read from the raw
//! response text, so a numeric price never passes through `f64`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::value::RawValue;
use stakelens_numeric::parse_decimal;
use tracing::debug;

use crate::{GatewayError, PriceFeed, PriceQuote};

#[derive(Debug, Deserialize)]
struct LastPriceResponse {
    success: bool,
    #[serde(default)]
    data: HashMap<String, PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: Box<RawValue>,
    #[serde(default)]
    price_timestamp: Option<Box<RawValue>>,
}

/// Fetches prices from an HTTP endpoint on every call.
///
/// Wrap in [`CachedPriceFeed`](crate::CachedPriceFeed) to reuse quotes.
#[derive(Clone, Debug)]
pub struct HttpPriceFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpPriceFeed {
    /// Create a feed for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (TLS backend unavailable).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        let reason = if err.is_timeout() {
            format!("timeout: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        GatewayError::unavailable(&self.url, reason)
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote, GatewayError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?
            .error_for_status()
            .map_err(|e| self.transport_error(e))?
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        let quote = parse_quote(&self.url, &body, symbol)?;
        debug!(source = %self.url, symbol, price = %quote.price, "price fetched");
        Ok(quote)
    }
}

/// Extract the quote for `symbol` from a last-price response body.
fn parse_quote(origin: &str, body: &str, symbol: &str) -> Result<PriceQuote, GatewayError> {
    let response: LastPriceResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::unavailable(origin, e))?;
    if !response.success {
        return Err(GatewayError::unavailable(origin, "price service reported failure"));
    }
    let entry = response
        .data
        .get(symbol)
        .ok_or_else(|| GatewayError::NotFound {
            what: format!("price for `{symbol}`"),
        })?;

    let price = parse_decimal(&scalar_text(origin, &entry.price)?)
        .map_err(|e| GatewayError::unavailable(origin, e))?;
    let as_of = match &entry.price_timestamp {
        Some(raw) => scalar_text(origin, raw)?,
        None => String::new(),
    };
    Ok(PriceQuote { price, as_of })
}

/// Text of a JSON scalar exactly as sent: strings unquoted, numbers verbatim,
/// `null` empty.
fn scalar_text(origin: &str, raw: &RawValue) -> Result<String, GatewayError> {
    let text = raw.get().trim();
    if text.starts_with('"') {
        return serde_json::from_str(text).map_err(|e| GatewayError::unavailable(origin, e));
    }
    if text == "null" {
        return Ok(String::new());
    }
    Ok(text.to_string())
}
