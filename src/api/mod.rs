// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    balance::{BalanceState, Balances},
    blockchain::{AccountMeta, Asset, Instruction, TokenBalance},
    session::{ConnectionSnapshot, SessionState, SessionStatus},
    state::AppState,
    validation::ValidationResponse,
    wallet::{FeeOptions, PreparedTransfer},
};

pub mod balance;
pub mod health;
pub mod session;
pub mod settings;
pub mod transfers;
pub mod validate;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/config", get(settings::get_config))
        .route(
            "/session",
            get(session::get_session).delete(session::clear_session),
        )
        .route("/session/check", post(session::check_session))
        .route("/validate/address", post(validate::validate_address_handler))
        .route("/validate/amount", post(validate::validate_amount_handler))
        .route("/balances/{address}", get(balance::get_balances))
        .route(
            "/balances/{address}/watch",
            post(balance::watch_balances).delete(balance::unwatch_balances),
        )
        .route("/balances/{address}/refresh", post(balance::refresh_balances))
        .route("/transfers/prepare", post(transfers::prepare_transfer_handler))
        .route("/transfers/blockhash", get(transfers::recent_blockhash))
        .route("/transfers/error-message", post(transfers::wallet_error_message))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        health::readiness,
        settings::get_config,
        session::get_session,
        session::check_session,
        session::clear_session,
        validate::validate_address_handler,
        validate::validate_amount_handler,
        balance::get_balances,
        balance::watch_balances,
        balance::unwatch_balances,
        balance::refresh_balances,
        transfers::prepare_transfer_handler,
        transfers::recent_blockhash,
        transfers::wallet_error_message
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            settings::PublicConfig,
            SessionState,
            SessionStatus,
            ConnectionSnapshot,
            validate::AddressValidationRequest,
            validate::AmountValidationRequest,
            ValidationResponse,
            Asset,
            TokenBalance,
            Balances,
            BalanceState,
            AccountMeta,
            Instruction,
            FeeOptions,
            PreparedTransfer,
            transfers::PrepareTransferRequest,
            transfers::PrepareTransferResponse,
            transfers::RecentBlockhashResponse,
            transfers::WalletErrorRequest,
            transfers::WalletErrorResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Config", description = "Front-end settings"),
        (name = "Session", description = "Wallet session tracking"),
        (name = "Validation", description = "Recipient and amount checks"),
        (name = "Balances", description = "SOL and USDC balances"),
        (name = "Transfers", description = "Sponsored transfer preparation")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::in_memory(AppConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let _ = app().into_make_service();
    }

    #[tokio::test]
    async fn liveness_route_responds() {
        let response = app()
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn validate_route_round_trips_json() {
        let response = app()
            .oneshot(
                Request::post("/v1/validate/amount")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"amount":"1.5","asset":"SOL"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"valid":true}"#);
    }

    #[tokio::test]
    async fn bad_balance_address_is_json_error() {
        let response = app()
            .oneshot(Request::get("/v1/balances/xyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Invalid wallet address"}"#);
    }

    #[test]
    fn openapi_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/session"));
        assert!(doc.paths.paths.contains_key("/v1/balances/{address}/watch"));
        assert!(doc.paths.paths.contains_key("/v1/transfers/blockhash"));
        assert!(doc.paths.paths.contains_key("/v1/transfers/error-message"));
    }
}
