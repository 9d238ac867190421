//! [`LedgerSource`] over the Solana JSON-RPC API.

use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_pubkey::Pubkey;
use stakelens_numeric::TokenAmount;
use tracing::debug;

use crate::{AccountInfo, GatewayError, LedgerSource};

/// Reads from a single RPC endpoint at `confirmed` commitment.
pub struct RpcLedger {
    client: RpcClient,
    url: String,
}

impl RpcLedger {
    /// Connect lazily to `url`; no request is made until the first call.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let url = url.into();
        let client = RpcClient::new_with_timeout_and_commitment(
            url.clone(),
            timeout,
            CommitmentConfig::confirmed(),
        );
        Self { client, url }
    }

    fn map_error(&self, what: String, err: ClientError) -> GatewayError {
        let reason = err.to_string();
        if reason.contains("could not find account") || reason.contains("Invalid param: not a Token") {
            GatewayError::NotFound { what }
        } else {
            GatewayError::unavailable(&self.url, reason)
        }
    }

    fn token_amount(&self, amount: &str, decimals: u8) -> Result<TokenAmount, GatewayError> {
        TokenAmount::parse_raw(amount, decimals).map_err(|e| GatewayError::unavailable(&self.url, e))
    }
}

#[async_trait]
impl LedgerSource for RpcLedger {
    fn label(&self) -> &str {
        &self.url
    }

    async fn probe(&self) -> Result<(), GatewayError> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| GatewayError::unavailable(&self.url, e))?;
        debug!(source = %self.url, %blockhash, "probe ok");
        Ok(())
    }

    async fn account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>, GatewayError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| GatewayError::unavailable(&self.url, e))?;
        Ok(response.value.map(|account| AccountInfo {
            owner: account.owner,
            lamports: account.lamports,
            data: account.data,
        }))
    }

    async fn token_account_balance(&self, address: &Pubkey) -> Result<TokenAmount, GatewayError> {
        let balance = self
            .client
            .get_token_account_balance(address)
            .await
            .map_err(|e| self.map_error(format!("token account {address}"), e))?;
        self.token_amount(&balance.amount, balance.decimals)
    }

    async fn token_supply(&self, mint: &Pubkey) -> Result<TokenAmount, GatewayError> {
        let supply = self
            .client
            .get_token_supply(mint)
            .await
            .map_err(|e| self.map_error(format!("mint {mint}"), e))?;
        self.token_amount(&supply.amount, supply.decimals)
    }
}
