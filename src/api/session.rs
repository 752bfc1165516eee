// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session status endpoints.

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    blockchain::Pubkey,
    error::ApiError,
    session::{ConnectionSnapshot, SessionStatus},
    state::AppState,
};

/// Current session status.
#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses((status = 200, body = SessionStatus))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.tracker.status())
}

/// Derive the session from what the wallet SDK currently reports.
///
/// Never triggers a passkey prompt. A disconnected wallet with a recent
/// record yields `last_active` so the front end can offer to reconnect.
#[utoipa::path(
    post,
    path = "/v1/session/check",
    request_body = ConnectionSnapshot,
    tag = "Session",
    responses((status = 200, body = SessionStatus))
)]
pub async fn check_session(
    State(state): State<AppState>,
    Json(snapshot): Json<ConnectionSnapshot>,
) -> Json<SessionStatus> {
    Json(state.tracker.check(&snapshot).await)
}

/// Sign out: forget the session and stop polling the wallet's balances.
#[utoipa::path(
    delete,
    path = "/v1/session",
    tag = "Session",
    responses(
        (status = 200, body = SessionStatus),
        (status = 500, description = "Session record could not be removed")
    )
)]
pub async fn clear_session(State(state): State<AppState>) -> Result<Json<SessionStatus>, ApiError> {
    let previous = state.tracker.status().wallet_address;
    let status = state.tracker.clear().await?;

    if let Some(owner) = previous.and_then(|a| a.parse::<Pubkey>().ok()) {
        if state.pollers.stop(&owner).await {
            info!(owner = %owner, "Stopped balance polling on sign-out");
        }
    }

    Ok(Json(status))
}
