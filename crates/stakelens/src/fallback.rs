//! Primary/fallback source selection.
//!
//! ```text
//!   ┌─────────┐  probe fails   ┌──────────┐  probe fails
//!   │ Primary │ ─────────────► │ Fallback │ ─────────────► SourceUnavailable
//!   └─────────┘                └──────────┘
//!        │ probe ok                 │ probe ok
//!        ▼                          ▼
//!   owns the rest of the request (no switching mid-pipeline)
//! ```
//!
//! Only the liveness probe is retried. Failures after a source has been
//! selected (decode errors, gateway errors) are never retried on the other
//! source.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cancel::guarded;
use crate::{LedgerSource, ReadError};

/// Which source a request ended up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRole {
    /// The primary (or explicitly overridden) source
    Primary,
    /// The fallback source
    Fallback,
}

/// The source selected for one request.
#[derive(Clone)]
pub struct ActiveSource {
    /// How it was reached
    pub role: SourceRole,
    /// The live source
    pub source: Arc<dyn LedgerSource>,
}

/// Picks a live source for each request.
#[derive(Clone)]
pub struct FallbackController {
    primary: Arc<dyn LedgerSource>,
    fallback: Arc<dyn LedgerSource>,
}

impl FallbackController {
    /// Create a controller.
    pub fn new(primary: Arc<dyn LedgerSource>, fallback: Arc<dyn LedgerSource>) -> Self {
        Self { primary, fallback }
    }

    /// Same fallback, different primary.
    ///
    /// An explicit source override takes the primary's place; the fallback
    /// still applies if it fails its probe.
    pub fn with_primary(&self, primary: Arc<dyn LedgerSource>) -> Self {
        Self {
            primary,
            fallback: Arc::clone(&self.fallback),
        }
    }

    /// Probe the primary, then the fallback, and return the first live one.
    ///
    /// # Errors
    ///
    /// [`ReadError::SourceUnavailable`] if both probes fail,
    /// [`ReadError::Cancelled`] if `cancel` fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<ActiveSource, ReadError> {
        let primary_error = match guarded(cancel, self.primary.probe()).await? {
            Ok(()) => {
                info!(source = %self.primary.label(), role = "primary", "data source selected");
                return Ok(ActiveSource {
                    role: SourceRole::Primary,
                    source: Arc::clone(&self.primary),
                });
            }
            Err(error) => error,
        };
        warn!(
            source = %self.primary.label(),
            error = %primary_error,
            connection = primary_error.is_connection(),
            "primary probe failed, trying fallback"
        );

        match guarded(cancel, self.fallback.probe()).await? {
            Ok(()) => {
                info!(source = %self.fallback.label(), role = "fallback", "data source selected");
                Ok(ActiveSource {
                    role: SourceRole::Fallback,
                    source: Arc::clone(&self.fallback),
                })
            }
            Err(fallback_error) => {
                warn!(
                    source = %self.fallback.label(),
                    error = %fallback_error,
                    "fallback probe failed"
                );
                Err(ReadError::SourceUnavailable {
                    primary: self.primary.label().to_string(),
                    primary_error,
                    fallback: self.fallback.label().to_string(),
                    fallback_error,
                })
            }
        }
    }
}
