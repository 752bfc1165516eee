// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::balance::BalanceError;
use crate::blockchain::SolanaClientError;
use crate::session::SessionError;
use crate::wallet::TransferError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Logs `detail` and answers with a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<BalanceError> for ApiError {
    fn from(e: BalanceError) -> Self {
        match e {
            BalanceError::Unavailable(_) => Self::service_unavailable(e.to_string()),
            BalanceError::WatchLimit { .. } => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, e.to_string())
            }
        }
    }
}

impl From<SolanaClientError> for ApiError {
    fn from(e: SolanaClientError) -> Self {
        warn!(error = %e, "Solana RPC call failed");
        Self::service_unavailable("Solana RPC unavailable")
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::internal(e)
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::NotConnected | TransferError::Busy => {
                Self::new(StatusCode::CONFLICT, e.to_string())
            }
            TransferError::InvalidRecipient(_) | TransferError::InvalidAmount(_) => {
                Self::unprocessable(e.to_string())
            }
            TransferError::Rejected { message, .. } => Self::new(StatusCode::BAD_GATEWAY, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
