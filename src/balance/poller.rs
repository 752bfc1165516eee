// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{BalanceError, BalanceFetcher, BalanceState};
use crate::blockchain::Pubkey;

/// Default interval between balance refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of wallets polled at once.
pub const DEFAULT_MAX_WATCHED: usize = 16;

/// Background balance poller for one wallet.
pub struct BalancePoller {
    fetcher: BalanceFetcher,
    owner: Pubkey,
    interval: Duration,
    state: watch::Sender<BalanceState>,
    refresh: Arc<Notify>,
}

impl BalancePoller {
    /// Spawn a poller for `owner`. Polling stops when the returned handle is
    /// stopped or dropped.
    pub fn start(fetcher: BalanceFetcher, owner: Pubkey, interval: Duration) -> PollHandle {
        let (state, state_rx) = watch::channel(BalanceState::default());
        let refresh = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let poller = Self {
            fetcher,
            owner,
            interval,
            state,
            refresh: refresh.clone(),
        };
        let task = tokio::spawn(poller.run(cancel.clone()));

        PollHandle {
            owner,
            state: state_rx,
            refresh,
            cancel,
            task,
        }
    }

    async fn run(self, cancel: CancellationToken) {
        info!(
            owner = %self.owner,
            interval_secs = self.interval.as_secs(),
            "Balance poller starting"
        );

        loop {
            self.state.send_modify(|s| s.loading = true);

            let result = tokio::select! {
                result = self.fetcher.fetch(&self.owner) => result,
                _ = cancel.cancelled() => break,
            };

            // A stop that raced the fetch wins.
            if cancel.is_cancelled() {
                break;
            }

            match result {
                Ok(balances) => {
                    debug!(
                        owner = %self.owner,
                        sol = %balances.sol.balance_formatted,
                        usdc = %balances.usdc.balance_formatted,
                        "Balances refreshed"
                    );
                    self.state.send_modify(|s| {
                        s.balances = Some(balances);
                        s.loading = false;
                        s.error = None;
                        s.updated_at = Some(Utc::now());
                    });
                }
                Err(e) => {
                    warn!(owner = %self.owner, error = %e, "Balance refresh failed");
                    self.state.send_modify(|s| {
                        s.loading = false;
                        s.error = Some(e.to_string());
                    });
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = self.refresh.notified() => {
                    debug!(owner = %self.owner, "Manual balance refresh");
                },
                _ = cancel.cancelled() => break,
            }
        }

        info!(owner = %self.owner, "Balance poller stopped");
    }
}

/// Control handle for a running [`BalancePoller`].
pub struct PollHandle {
    owner: Pubkey,
    state: watch::Receiver<BalanceState>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    /// Latest published state.
    pub fn state(&self) -> BalanceState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BalanceState> {
        self.state.clone()
    }

    /// Fetch again without waiting for the next interval.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Running pollers keyed by wallet address, at most `max_watched` at a time.
pub struct PollerRegistry {
    fetcher: BalanceFetcher,
    interval: Duration,
    max_watched: usize,
    handles: RwLock<HashMap<Pubkey, PollHandle>>,
}

impl PollerRegistry {
    pub fn new(fetcher: BalanceFetcher, interval: Duration, max_watched: usize) -> Self {
        Self {
            fetcher,
            interval,
            max_watched,
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn fetcher(&self) -> &BalanceFetcher {
        &self.fetcher
    }

    /// Start polling `owner` unless a poller is already running. Returns the
    /// current state and whether a new poller was started.
    ///
    /// Fails with [`BalanceError::WatchLimit`] when `max_watched` pollers
    /// are already running.
    pub async fn watch(&self, owner: Pubkey) -> Result<(BalanceState, bool), BalanceError> {
        let mut handles = self.handles.write().await;
        if let Some(handle) = handles.get(&owner).filter(|h| !h.is_stopped()) {
            return Ok((handle.state(), false));
        }

        handles.retain(|_, h| !h.is_stopped());
        if handles.len() >= self.max_watched {
            warn!(owner = %owner, limit = self.max_watched, "Refusing to watch another wallet");
            return Err(BalanceError::WatchLimit {
                limit: self.max_watched,
            });
        }

        let handle = BalancePoller::start(self.fetcher.clone(), owner, self.interval);
        let state = handle.state();
        handles.insert(owner, handle);
        Ok((state, true))
    }

    pub async fn state(&self, owner: &Pubkey) -> Option<BalanceState> {
        self.handles.read().await.get(owner).map(PollHandle::state)
    }

    pub async fn subscribe(&self, owner: &Pubkey) -> Option<watch::Receiver<BalanceState>> {
        self.handles.read().await.get(owner).map(PollHandle::subscribe)
    }

    /// Returns `false` when `owner` is not being polled.
    pub async fn refresh(&self, owner: &Pubkey) -> bool {
        match self.handles.read().await.get(owner) {
            Some(handle) => {
                handle.refresh();
                true
            }
            None => false,
        }
    }

    /// Stop polling `owner`. Returns whether a poller was running.
    pub async fn stop(&self, owner: &Pubkey) -> bool {
        let removed = self.handles.write().await.remove(owner);
        if let Some(handle) = &removed {
            handle.stop();
        }
        removed.is_some()
    }

    pub async fn stop_all(&self) {
        let mut handles = self.handles.write().await;
        for handle in handles.values() {
            handle.stop();
        }
        handles.clear();
    }

    pub async fn watched(&self) -> Vec<Pubkey> {
        self.handles.read().await.keys().copied().collect()
    }
}
