//! Error types for the read pipeline.

use std::path::PathBuf;

use stakelens_layout::{IdlError, NoMatchError, RegistryError};
use thiserror::Error;

/// Substrings that mark a failure as a transport problem rather than a
/// well-formed negative answer.
const CONNECTION_MARKERS: [&str; 9] = [
    "network",
    "connection",
    "timeout",
    "timed out",
    "econnrefused",
    "econnreset",
    "socket",
    "failed to fetch",
    "dns",
];

/// Failure of a single remote read.
///
/// Gateway errors never abort a summary. They are logged and the affected
/// figures degrade to sentinels.
#[derive(Clone, Debug, PartialEq, Eq, Error, strum::IntoStaticStr)]
pub enum GatewayError {
    /// The remote answered but the entity does not exist
    #[error("{what} not found")]
    NotFound {
        /// What was looked up
        what: String,
    },

    /// The remote could not answer
    #[error("{origin} unavailable: {reason}")]
    Unavailable {
        /// Source label (RPC url, price endpoint)
        origin: String,
        /// Underlying failure
        reason: String,
    },
}

impl GatewayError {
    /// Variant name for log fields.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Shorthand for [`GatewayError::Unavailable`].
    pub fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this looks like a transport failure (refused, reset, timed out).
    pub fn is_connection(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Unavailable { reason, .. } => {
                let reason = reason.to_ascii_lowercase();
                CONNECTION_MARKERS.iter().any(|marker| reason.contains(marker))
            }
        }
    }
}

/// Errors returned by [`StakeLens::read_account`](crate::StakeLens::read_account).
#[derive(Debug, Error, strum::IntoStaticStr)]
pub enum ReadError {
    /// The address is not valid base58
    #[error("invalid account address `{0}`")]
    InvalidAddress(String),

    /// Both the primary and the fallback source failed their probe
    #[error("no data source available: {primary} ({primary_error}); {fallback} ({fallback_error})")]
    SourceUnavailable {
        /// Primary source label
        primary: String,
        /// Primary probe error
        primary_error: GatewayError,
        /// Fallback source label
        fallback: String,
        /// Fallback probe error
        fallback_error: GatewayError,
    },

    /// No account exists at the address
    #[error("account `{0}` not found")]
    AccountNotFound(String),

    /// Reading the account itself failed after a source was selected
    #[error("failed to fetch account: {0}")]
    Fetch(GatewayError),

    /// No registered layout decodes the account data
    #[error(transparent)]
    NoMatch(#[from] NoMatchError),

    /// A staking-shaped tree lacks a field the summary needs
    #[error("layout `{layout}` has no field `{field}`")]
    MissingField {
        /// Matched layout
        layout: String,
        /// Missing field
        field: String,
    },

    /// The request was cancelled
    #[error("request cancelled")]
    Cancelled,
}

impl ReadError {
    /// Variant name for log fields.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Errors while loading a [`ReaderConfig`](crate::ReaderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed TOML
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment variable holds an unusable value
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// An address setting is not valid base58
    #[error("invalid address for `{field}`: {value:?}")]
    InvalidAddress {
        /// Setting name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// The IDL file could not be read
    #[error("failed to read IDL {}: {source}", path.display())]
    IdlRead {
        /// Configured path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The IDL file is not a valid Anchor IDL
    #[error("invalid IDL {}: {source}", path.display())]
    Idl {
        /// Configured path
        path: PathBuf,
        /// Import failure
        source: IdlError,
    },

    /// The built-in layouts failed to register
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The HTTP client for the price feed could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_connection() {
        assert!(GatewayError::unavailable("rpc", "Connection refused (os error 111)").is_connection());
        assert!(GatewayError::unavailable("rpc", "operation timed out").is_connection());
        assert!(!GatewayError::unavailable("rpc", "invalid params").is_connection());
        assert!(!GatewayError::NotFound { what: "account".into() }.is_connection());
    }

    #[test]
    fn test_names() {
        assert_eq!(GatewayError::NotFound { what: "x".into() }.name(), "NotFound");
        assert_eq!(ReadError::Cancelled.name(), "Cancelled");
    }
}
