// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use passkey_wallet_companion::{
    api::router,
    blockchain::SolanaRpcClient,
    config::{env_or_default, AppConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    session::FileSessionStore,
    state::AppState,
};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if env_or_default(LOG_FORMAT_ENV, "pretty").eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.data_dir).await {
        error!(path = %config.data_dir.display(), error = %e, "Failed to create data directory");
        std::process::exit(1);
    }

    let rpc = match SolanaRpcClient::new(config.network.clone(), &config.rpc_url) {
        Ok(rpc) => rpc,
        Err(e) => {
            error!(error = %e, "Failed to build Solana RPC client");
            std::process::exit(1);
        }
    };

    info!(
        network = config.network.name,
        rpc_url = %config.rpc_url,
        data_dir = %config.data_dir.display(),
        development = config.development,
        "Starting passkey wallet companion"
    );

    let store = Arc::new(FileSessionStore::new(&config.data_dir));
    let state = AppState::new(config, store, rpc);

    let shutdown = CancellationToken::new();
    let listener_task = state.tracker.clone().spawn_change_listener(shutdown.clone());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    info!(%addr, "Listening (docs at /docs)");

    let app = router(state.clone());
    let serve_shutdown = shutdown.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            serve_shutdown.cancel();
        })
        .await;

    shutdown.cancel();
    state.pollers.stop_all().await;
    if let Err(e) = listener_task.await {
        error!(error = %e, "Session change listener panicked");
    }

    if let Err(e) = result {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
    info!("Shut down cleanly");
}
