// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::balance::{BalanceFetcher, PollerRegistry};
use crate::blockchain::SolanaRpcClient;
use crate::config::AppConfig;
use crate::session::{InMemorySessionStore, SessionStore, SessionTracker};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tracker: Arc<SessionTracker>,
    pub rpc: Arc<SolanaRpcClient>,
    pub pollers: Arc<PollerRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn SessionStore>, rpc: SolanaRpcClient) -> Self {
        let rpc = Arc::new(rpc);
        let fetcher = BalanceFetcher::new(rpc.clone(), config.network.clone());
        let pollers =
            PollerRegistry::new(fetcher, config.poll_interval, config.max_watched_wallets);
        let tracker = SessionTracker::new(store);

        Self {
            config: Arc::new(config),
            tracker: Arc::new(tracker),
            rpc,
            pollers: Arc::new(pollers),
        }
    }

    /// State backed by an in-memory session store.
    pub fn in_memory(config: AppConfig) -> Result<Self, crate::blockchain::SolanaClientError> {
        let rpc = SolanaRpcClient::new(config.network.clone(), &config.rpc_url)?;
        Ok(Self::new(config, Arc::new(InMemorySessionStore::new()), rpc))
    }
}
