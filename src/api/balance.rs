// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet balance endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    balance::BalanceState, blockchain::Pubkey, error::ApiError, state::AppState,
};

fn parse_owner(address: &str) -> Result<Pubkey, ApiError> {
    address
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid wallet address"))
}

/// Balances of a wallet.
///
/// Returns the poller's latest state when the address is watched, otherwise
/// fetches once.
#[utoipa::path(
    get,
    path = "/v1/balances/{address}",
    tag = "Balances",
    params(("address" = String, Path, description = "Wallet address (base58)")),
    responses(
        (status = 200, description = "Balances retrieved", body = BalanceState),
        (status = 400, description = "Invalid wallet address"),
        (status = 503, description = "Solana RPC unavailable")
    )
)]
pub async fn get_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceState>, ApiError> {
    let owner = parse_owner(&address)?;

    if let Some(current) = state.pollers.state(&owner).await {
        return Ok(Json(current));
    }

    let balances = state.pollers.fetcher().fetch(&owner).await?;
    Ok(Json(BalanceState::fetched(balances)))
}

/// Start polling a wallet's balances.
#[utoipa::path(
    post,
    path = "/v1/balances/{address}/watch",
    tag = "Balances",
    params(("address" = String, Path, description = "Wallet address (base58)")),
    responses(
        (status = 201, description = "Polling started", body = BalanceState),
        (status = 200, description = "Already polling", body = BalanceState),
        (status = 400, description = "Invalid wallet address"),
        (status = 429, description = "Too many wallets are being watched")
    )
)]
pub async fn watch_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<(StatusCode, Json<BalanceState>), ApiError> {
    let owner = parse_owner(&address)?;
    let (current, started) = state.pollers.watch(owner).await?;
    let status = if started {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(current)))
}

/// Stop polling a wallet's balances. Idempotent.
#[utoipa::path(
    delete,
    path = "/v1/balances/{address}/watch",
    tag = "Balances",
    params(("address" = String, Path, description = "Wallet address (base58)")),
    responses(
        (status = 204, description = "Polling stopped"),
        (status = 400, description = "Invalid wallet address")
    )
)]
pub async fn unwatch_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<StatusCode, ApiError> {
    let owner = parse_owner(&address)?;
    state.pollers.stop(&owner).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Refresh a watched wallet now.
#[utoipa::path(
    post,
    path = "/v1/balances/{address}/refresh",
    tag = "Balances",
    params(("address" = String, Path, description = "Wallet address (base58)")),
    responses(
        (status = 202, description = "Refresh scheduled"),
        (status = 400, description = "Invalid wallet address"),
        (status = 404, description = "Wallet is not being watched")
    )
)]
pub async fn refresh_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<StatusCode, ApiError> {
    let owner = parse_owner(&address)?;
    if state.pollers.refresh(&owner).await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(ApiError::not_found("Wallet is not being watched"))
    }
}
