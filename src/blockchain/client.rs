// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana JSON-RPC client for balance queries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use super::types::{NetworkConfig, Pubkey};

/// Per-request timeout for RPC calls.
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only balance queries the fetcher depends on.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Native balance in lamports.
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64, SolanaClientError>;

    /// Token account balance in base units, `None` when the account does
    /// not exist.
    async fn token_account_balance(
        &self,
        account: &Pubkey,
    ) -> Result<Option<u64>, SolanaClientError>;
}

/// Solana RPC client.
pub struct SolanaRpcClient {
    /// Cluster configuration
    network: NetworkConfig,
    /// RPC endpoint (may differ from the cluster default)
    rpc_url: url::Url,
    http: Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct UiTokenAmount {
    amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

impl SolanaRpcClient {
    /// Create a new client against `rpc_url` for the given cluster.
    pub fn new(network: NetworkConfig, rpc_url: &str) -> Result<Self, SolanaClientError> {
        let rpc_url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| SolanaClientError::InvalidRpcUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .map_err(|e| SolanaClientError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            network,
            rpc_url,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Native balance in lamports.
    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64, SolanaClientError> {
        let response: WithContext<u64> = self
            .call("getBalance", json!([address.to_string(), { "commitment": "confirmed" }]))
            .await?;
        Ok(response.value)
    }

    /// Token account balance in base units; `None` if the account is missing.
    pub async fn get_token_account_balance(
        &self,
        account: &Pubkey,
    ) -> Result<Option<u64>, SolanaClientError> {
        let result: Result<WithContext<UiTokenAmount>, _> = self
            .call(
                "getTokenAccountBalance",
                json!([account.to_string(), { "commitment": "confirmed" }]),
            )
            .await;

        match result {
            Ok(response) => response
                .value
                .amount
                .parse::<u64>()
                .map(Some)
                .map_err(|e| SolanaClientError::InvalidResponse(format!("token amount: {e}"))),
            Err(e) if e.is_missing_account() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Most recent blockhash, used by the front end when assembling transfers.
    pub async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, SolanaClientError> {
        let response: WithContext<LatestBlockhash> = self
            .call("getLatestBlockhash", json!([{ "commitment": "confirmed" }]))
            .await?;
        Ok(response.value)
    }

    /// Node health; `Ok(())` when the node reports "ok".
    pub async fn get_health(&self) -> Result<(), SolanaClientError> {
        let status: String = self.call("getHealth", json!([])).await?;
        if status == "ok" {
            Ok(())
        } else {
            Err(SolanaClientError::InvalidResponse(format!(
                "node health is `{status}`"
            )))
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, SolanaClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| SolanaClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolanaClientError::Http(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SolanaClientError::InvalidResponse(format!("{method}: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(SolanaClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        parsed
            .result
            .ok_or_else(|| SolanaClientError::InvalidResponse(format!("{method}: missing result")))
    }
}

#[async_trait]
impl BalanceSource for SolanaRpcClient {
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64, SolanaClientError> {
        self.get_balance(owner).await
    }

    async fn token_account_balance(
        &self,
        account: &Pubkey,
    ) -> Result<Option<u64>, SolanaClientError> {
        self.get_token_account_balance(account).await
    }
}

/// Errors that can occur during RPC operations.
#[derive(Debug, thiserror::Error)]
pub enum SolanaClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

impl SolanaClientError {
    /// Whether the node rejected the query because the account does not exist.
    pub fn is_missing_account(&self) -> bool {
        matches!(self, SolanaClientError::Rpc { message, .. }
            if message.contains("could not find account"))
    }
}
