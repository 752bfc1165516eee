// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    blockchain::Asset,
    state::AppState,
    validation::{validate_address, validate_amount, ValidationResponse},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddressValidationRequest {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AmountValidationRequest {
    /// Amount in display units
    pub amount: String,
    pub asset: Asset,
}

#[utoipa::path(
    post,
    path = "/v1/validate/address",
    request_body = AddressValidationRequest,
    tag = "Validation",
    responses((status = 200, body = ValidationResponse))
)]
pub async fn validate_address_handler(
    Json(request): Json<AddressValidationRequest>,
) -> Json<ValidationResponse> {
    Json(validate_address(&request.address).into())
}

#[utoipa::path(
    post,
    path = "/v1/validate/amount",
    request_body = AmountValidationRequest,
    tag = "Validation",
    responses((status = 200, body = ValidationResponse))
)]
pub async fn validate_amount_handler(
    State(state): State<AppState>,
    Json(request): Json<AmountValidationRequest>,
) -> Json<ValidationResponse> {
    let limits = state.config.amount_limits();
    Json(validate_amount(&request.amount, request.asset, &limits).into())
}
