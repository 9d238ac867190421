//! Candidate resolver.
//!
//! Account data does not say which layout it uses. The resolver tries every
//! registered layout in registration order and takes the first one that
//! decodes without a structural error. There is no scoring.

use thiserror::Error;
use tracing::debug;

use crate::{DecodeError, DecodedValue, Decoder, SchemaRegistry};

/// One failed decode attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeAttempt {
    /// Layout that was tried
    pub layout: String,
    /// Why it did not match
    pub error: DecodeError,
}

/// No registered layout decoded the data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("no layout matched ({} attempted)", attempts.len())]
pub struct NoMatchError {
    /// Every layout tried, with its terminal error, in try-order
    pub attempts: Vec<DecodeAttempt>,
}

impl NoMatchError {
    /// Names of the layouts that were tried.
    pub fn attempted(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.layout.as_str()).collect()
    }
}

/// A successful resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Name of the matched layout
    pub layout: String,
    /// Decoded tree
    pub value: DecodedValue,
    /// Layouts tried before the match, with their errors
    pub attempts: Vec<DecodeAttempt>,
}

/// First-match resolver over a registry.
#[derive(Clone, Copy, Debug)]
pub struct CandidateResolver<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> CandidateResolver<'a> {
    /// Create a resolver over `registry`.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Decode `bytes` with the first layout that fits.
    ///
    /// # Errors
    ///
    /// [`NoMatchError`] listing every attempted layout if none decodes.
    pub fn resolve(&self, bytes: &[u8]) -> Result<Resolution, NoMatchError> {
        let decoder = Decoder::new(self.registry);
        let mut attempts = Vec::new();

        for layout in self.registry.layouts() {
            match decoder.decode(layout, bytes) {
                Ok(value) => {
                    debug!(layout = %layout.name(), skipped = attempts.len(), "layout matched");
                    return Ok(Resolution {
                        layout: layout.name().to_string(),
                        value,
                        attempts,
                    });
                }
                Err(error) => {
                    debug!(layout = %layout.name(), error = error.name(), %error, "layout rejected");
                    attempts.push(DecodeAttempt {
                        layout: layout.name().to_string(),
                        error,
                    });
                }
            }
        }

        Err(NoMatchError { attempts })
    }
}
