// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public front-end settings.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::session::SESSION_EXPIRY_HOURS;
use crate::state::AppState;

/// Endpoints and limits the front end needs to configure the wallet SDK.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicConfig {
    /// Cluster name
    pub network: String,
    pub rpc_url: String,
    /// Passkey portal
    pub portal_url: String,
    /// Fee sponsorship relay
    pub paymaster_url: String,
    pub explorer_url: String,
    /// USDC mint on this cluster
    pub usdc_mint: String,
    /// Largest SOL transfer, whole tokens
    pub max_sol_amount: u64,
    /// Largest USDC transfer, whole tokens
    pub max_usdc_amount: u64,
    pub balance_poll_interval_secs: u64,
    pub session_expiry_hours: i64,
}

#[utoipa::path(
    get,
    path = "/v1/config",
    tag = "Config",
    responses((status = 200, body = PublicConfig))
)]
pub async fn get_config(State(state): State<AppState>) -> Json<PublicConfig> {
    let config = &state.config;
    Json(PublicConfig {
        network: config.network.name.to_string(),
        rpc_url: config.rpc_url.clone(),
        portal_url: config.portal_url.clone(),
        paymaster_url: config.paymaster_url.clone(),
        explorer_url: config.network.explorer_url.to_string(),
        usdc_mint: config.network.usdc_mint.to_string(),
        max_sol_amount: config.max_sol_amount,
        max_usdc_amount: config.max_usdc_amount,
        balance_poll_interval_secs: config.poll_interval.as_secs(),
        session_expiry_hours: SESSION_EXPIRY_HOURS,
    })
}
