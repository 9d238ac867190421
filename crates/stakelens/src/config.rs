//! Runtime configuration.
//!
//! Defaults come from the `stakelens-ids` constants of the selected network
//! feature. A TOML document or `STAKELENS_*` environment variables override
//! them field by field.
//!
//! ```toml
//! primary_rpc_url = "https://my-node.example/rpc"
//! request_timeout_ms = 5000
//! staking_layouts = ["staking", "stakingV2"]
//! idl_path = "target/idl/adrena.json"
//! ```

use core::str::FromStr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use solana_pubkey::Pubkey;
use stakelens_layout::{DEFAULT_AMOUNT_DECIMALS, SchemaRegistry, adrena_registry, from_idl_json};
use tracing::{info, warn};

use crate::ConfigError;

/// Overrides the primary RPC URL.
pub const ENV_PRIMARY_RPC_URL: &str = "STAKELENS_PRIMARY_RPC_URL";
/// Overrides the fallback RPC URL.
pub const ENV_FALLBACK_RPC_URL: &str = "STAKELENS_FALLBACK_RPC_URL";
/// Overrides the price API URL.
pub const ENV_PRICE_API_URL: &str = "STAKELENS_PRICE_API_URL";
/// Overrides the reward vault address.
pub const ENV_REWARD_VAULT: &str = "STAKELENS_REWARD_VAULT";
/// Overrides the request timeout, in milliseconds.
pub const ENV_REQUEST_TIMEOUT_MS: &str = "STAKELENS_REQUEST_TIMEOUT_MS";
/// Points at an Anchor IDL whose accounts are tried after the built-in ones.
pub const ENV_IDL_PATH: &str = "STAKELENS_IDL_PATH";

/// Settings for a [`StakeLens`](crate::StakeLens) reader.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// RPC endpoint probed first
    pub primary_rpc_url: String,
    /// RPC endpoint used when the primary fails its probe
    pub fallback_rpc_url: String,
    /// Last-price endpoint
    pub price_api_url: String,
    /// Token account whose balance backs pending rewards (base58)
    pub reward_vault: String,
    /// Per-request timeout for RPC and HTTP calls
    pub request_timeout_ms: u64,
    /// How long a price quote is reused; `0` disables the cache
    pub price_cache_ttl_secs: u64,
    /// Layout names that get a staking summary
    pub staking_layouts: Vec<String>,
    /// Decimals used to display integer fields classified as token amounts
    pub token_amount_decimals: u8,
    /// Anchor IDL whose accounts extend the built-in layouts
    pub idl_path: Option<PathBuf>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            primary_rpc_url: stakelens_ids::PRIMARY_RPC_URL.to_string(),
            fallback_rpc_url: stakelens_ids::FALLBACK_RPC_URL.to_string(),
            price_api_url: stakelens_ids::PRICE_API_URL.to_string(),
            reward_vault: stakelens_ids::REWARD_VAULT.to_string(),
            request_timeout_ms: 10_000,
            price_cache_ttl_secs: 30,
            staking_layouts: vec![stakelens_layout::STAKING_LAYOUT.to_string()],
            token_amount_decimals: DEFAULT_AMOUNT_DECIMALS,
            idl_path: None,
        }
    }
}

impl ReaderConfig {
    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEnv`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEnv`] if a variable is set to an unusable value.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_PRIMARY_RPC_URL) {
            config.primary_rpc_url = url;
        }
        if let Some(url) = get(ENV_FALLBACK_RPC_URL) {
            config.fallback_rpc_url = url;
        }
        if let Some(url) = get(ENV_PRICE_API_URL) {
            config.price_api_url = url;
        }
        if let Some(vault) = get(ENV_REWARD_VAULT) {
            if Pubkey::from_str(vault.trim()).is_err() {
                return Err(ConfigError::InvalidEnv {
                    var: ENV_REWARD_VAULT,
                    value: vault,
                });
            }
            config.reward_vault = vault.trim().to_string();
        }
        if let Some(timeout) = get(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout_ms =
                timeout.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_REQUEST_TIMEOUT_MS,
                    value: timeout.clone(),
                })?;
        }
        if let Some(path) = get(ENV_IDL_PATH) {
            config.idl_path = Some(PathBuf::from(path.trim()));
        }
        Ok(config)
    }

    /// Defaults overridden by a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Toml`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The reward vault as a key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidAddress`] if `reward_vault` is not base58.
    pub fn reward_vault_pubkey(&self) -> Result<Pubkey, ConfigError> {
        Pubkey::from_str(&self.reward_vault).map_err(|_| ConfigError::InvalidAddress {
            field: "reward_vault",
            value: self.reward_vault.clone(),
        })
    }

    /// The request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The price cache TTL, `None` if caching is disabled.
    pub fn price_cache_ttl(&self) -> Option<Duration> {
        (self.price_cache_ttl_secs > 0).then(|| Duration::from_secs(self.price_cache_ttl_secs))
    }

    /// The built-in Adrena layouts, followed by the accounts of `idl_path`
    /// if one is set.
    ///
    /// IDL entries that are not fixed-size, or whose name is already taken,
    /// are logged and left out.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IdlRead`] if the file cannot be read,
    /// [`ConfigError::Idl`] if it is not a valid IDL.
    pub fn registry(&self) -> Result<SchemaRegistry, ConfigError> {
        let mut registry = adrena_registry()?;
        let Some(path) = &self.idl_path else {
            return Ok(registry);
        };

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::IdlRead {
            path: path.clone(),
            source,
        })?;
        let import = from_idl_json(&json).map_err(|source| ConfigError::Idl {
            path: path.clone(),
            source,
        })?;
        for entry in &import.skipped {
            warn!(idl = %path.display(), name = %entry.name, reason = %entry.reason, "IDL entry skipped");
        }
        for name in registry.merge(&import.registry) {
            warn!(idl = %path.display(), name = %name, "IDL entry shadowed by a built-in definition");
        }
        info!(idl = %path.display(), layouts = registry.layouts().len(), "IDL layouts loaded");
        Ok(registry)
    }
}
