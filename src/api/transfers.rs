// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer preparation.
//!
//! The browser signs with the passkey, so the service only validates the
//! transfer and returns the instructions plus fee sponsorship settings for
//! the wallet SDK.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    blockchain::{Asset, Pubkey},
    error::ApiError,
    state::AppState,
    wallet::{
        prepare_transfer, user_facing_message, FeeOptions, PreparedTransfer, TransferRequest,
    },
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PrepareTransferRequest {
    /// Sender smart wallet address
    pub from: String,
    pub recipient: String,
    /// Amount in display units
    pub amount: String,
    pub asset: Asset,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrepareTransferResponse {
    pub transfer: PreparedTransfer,
    pub fee_options: FeeOptions,
}

#[utoipa::path(
    post,
    path = "/v1/transfers/prepare",
    request_body = PrepareTransferRequest,
    tag = "Transfers",
    responses(
        (status = 200, body = PrepareTransferResponse),
        (status = 400, description = "Invalid sender address"),
        (status = 422, description = "Invalid recipient or amount")
    )
)]
pub async fn prepare_transfer_handler(
    State(state): State<AppState>,
    Json(request): Json<PrepareTransferRequest>,
) -> Result<Json<PrepareTransferResponse>, ApiError> {
    let from: Pubkey = request
        .from
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid sender address"))?;

    let transfer = prepare_transfer(
        &from,
        &TransferRequest {
            recipient: request.recipient,
            amount: request.amount,
            asset: request.asset,
        },
        &state.config.amount_limits(),
        &state.config.network,
    )?;

    debug!(
        from = %transfer.from,
        recipient = %transfer.recipient,
        asset = %transfer.asset,
        amount_raw = transfer.amount_raw,
        "Prepared transfer"
    );

    Ok(Json(PrepareTransferResponse {
        transfer,
        fee_options: state.config.fee_options(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentBlockhashResponse {
    /// Cluster the blockhash belongs to
    pub network: String,
    pub blockhash: String,
    /// Last block height at which a transaction using this blockhash lands
    pub last_valid_block_height: u64,
}

/// Latest confirmed blockhash for the configured cluster.
#[utoipa::path(
    get,
    path = "/v1/transfers/blockhash",
    tag = "Transfers",
    responses(
        (status = 200, body = RecentBlockhashResponse),
        (status = 503, description = "Solana RPC unavailable")
    )
)]
pub async fn recent_blockhash(
    State(state): State<AppState>,
) -> Result<Json<RecentBlockhashResponse>, ApiError> {
    let latest = state.rpc.get_latest_blockhash().await?;

    Ok(Json(RecentBlockhashResponse {
        network: state.rpc.network().name.to_string(),
        blockhash: latest.blockhash,
        last_valid_block_height: latest.last_valid_block_height,
    }))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WalletErrorRequest {
    /// Error text reported by the wallet SDK
    pub raw: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletErrorResponse {
    pub message: String,
}

/// Translate a failed `signAndSendTransaction` into a message for the user.
///
/// In development the raw text is appended to the message.
#[utoipa::path(
    post,
    path = "/v1/transfers/error-message",
    request_body = WalletErrorRequest,
    tag = "Transfers",
    responses((status = 200, body = WalletErrorResponse))
)]
pub async fn wallet_error_message(
    State(state): State<AppState>,
    Json(request): Json<WalletErrorRequest>,
) -> Json<WalletErrorResponse> {
    Json(WalletErrorResponse {
        message: user_facing_message(&request.raw, state.config.detailed_errors()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALICE: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const BOB: &str = "HN7cABqLq46Es1jh92dQQisAq662SmxELLLsHHe4YWrH";

    fn request(from: &str, amount: &str, asset: Asset) -> PrepareTransferRequest {
        PrepareTransferRequest {
            from: from.into(),
            recipient: BOB.into(),
            amount: amount.into(),
            asset,
        }
    }

    fn state() -> AppState {
        AppState::in_memory(AppConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn prepares_usdc_with_sponsorship() {
        let Json(body) = prepare_transfer_handler(State(state()), Json(request(ALICE, "5", Asset::Usdc)))
            .await
            .unwrap();

        assert_eq!(body.transfer.amount_raw, 5_000_000);
        assert_eq!(body.transfer.instructions.len(), 2);
        assert_eq!(body.fee_options.paymaster_url, "https://kora.devnet.lazorkit.com");
        assert_eq!(
            body.fee_options.fee_token.map(|m| m.to_string()).as_deref(),
            Some("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU")
        );

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["transfer"]["asset"], "USDC");
        assert!(json["transfer"]["instructions"][1]["keys"].is_array());
    }

    #[tokio::test]
    async fn blockhash_includes_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "getLatestBlockhash" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 7 },
                    "value": { "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N", "lastValidBlockHeight": 300 }
                }
            })))
            .mount(&server)
            .await;

        let state = AppState::in_memory(AppConfig {
            rpc_url: server.uri(),
            ..AppConfig::default()
        })
        .unwrap();
        let Json(body) = recent_blockhash(State(state)).await.unwrap();
        assert_eq!(body.network, "devnet");
        assert_eq!(body.blockhash, "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N");
        assert_eq!(body.last_valid_block_height, 300);
    }

    #[tokio::test]
    async fn blockhash_rpc_failure_is_503() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let state = AppState::in_memory(AppConfig {
            rpc_url: server.uri(),
            ..AppConfig::default()
        })
        .unwrap();
        let err = recent_blockhash(State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.message, "Solana RPC unavailable");
    }

    #[cfg(not(feature = "dev"))]
    #[tokio::test]
    async fn error_message_hides_raw_text_in_production() {
        let Json(body) = wallet_error_message(
            State(state()),
            Json(WalletErrorRequest {
                raw: "NotAllowedError: user cancelled".into(),
            }),
        )
        .await;
        assert_eq!(body.message, "Passkey authentication was cancelled.");
    }

    #[tokio::test]
    async fn error_message_shows_raw_text_in_development() {
        let state = AppState::in_memory(AppConfig {
            development: true,
            ..AppConfig::default()
        })
        .unwrap();
        let Json(body) = wallet_error_message(
            State(state),
            Json(WalletErrorRequest {
                raw: "Blockhash not found".into(),
            }),
        )
        .await;
        assert_eq!(
            body.message,
            "The transaction expired before it was confirmed. Please try again. (Blockhash not found)"
        );
    }

    #[tokio::test]
    async fn invalid_sender_is_400() {
        let err = prepare_transfer_handler(State(state()), Json(request("", "1", Asset::Sol)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid sender address");
    }

    #[tokio::test]
    async fn invalid_amount_is_422() {
        let err = prepare_transfer_handler(State(state()), Json(request(ALICE, "0", Asset::Sol)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "Amount must be greater than 0");
    }
}
