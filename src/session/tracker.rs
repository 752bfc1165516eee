// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session status derivation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::SessionStore;
use super::{ConnectionSnapshot, SessionError, SessionRecord, SessionStatus, SESSION_EXPIRY_HOURS};
use crate::wallet::WalletConnection;

/// Default wait before the first check, giving the wallet SDK time to restore
/// its own connection.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Derives [`SessionStatus`] from the wallet connection and the stored record.
pub struct SessionTracker {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    expiry: TimeDelta,
    settle_delay: Duration,
    status: watch::Sender<SessionStatus>,
    last_connection: Mutex<ConnectionSnapshot>,
}

impl SessionTracker {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (status, _) = watch::channel(SessionStatus::loading());
        Self {
            store,
            clock: Arc::new(SystemClock),
            expiry: TimeDelta::hours(SESSION_EXPIRY_HOURS),
            settle_delay: DEFAULT_SETTLE_DELAY,
            status,
            last_connection: Mutex::new(ConnectionSnapshot::disconnected()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Latest derived status (`Loading` before the first check).
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status updates.
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// First check after startup: wait for the SDK to settle, then derive.
    pub async fn initialize(&self, connection: &dyn WalletConnection) -> SessionStatus {
        tokio::time::sleep(self.settle_delay).await;

        let snapshot = ConnectionSnapshot {
            connected: connection.is_connected(),
            wallet_address: connection.wallet_address().map(|a| a.to_string()),
        };
        self.check(&snapshot).await
    }

    /// One derive pass.
    ///
    /// A live connection refreshes the record. Otherwise a fresh record is
    /// reported as `last_active` and an expired one is deleted. The wallet
    /// SDK is never asked to connect from here.
    pub async fn check(&self, connection: &ConnectionSnapshot) -> SessionStatus {
        *self.last_connection.lock().await = connection.clone();
        let now = self.clock.now();

        let status = match connection.active_address() {
            Some(address) => {
                let record = SessionRecord {
                    wallet_address: address.to_string(),
                    last_active: now,
                };
                if let Err(e) = self.store.set(&record).await {
                    warn!(error = %e, "Failed to persist session record");
                }
                SessionStatus::connected(address, now)
            }
            None => self.derive_disconnected(now, true).await,
        };

        self.publish(status)
    }

    /// Forget the session immediately (sign-out).
    pub async fn clear(&self) -> Result<SessionStatus, SessionError> {
        self.store.delete().await?;
        *self.last_connection.lock().await = ConnectionSnapshot::disconnected();
        info!("Session cleared");
        Ok(self.publish(SessionStatus::disconnected(None)))
    }

    /// Re-derive after another writer changed the store. Never writes.
    pub async fn refresh_from_store(&self) -> SessionStatus {
        let connection = self.last_connection.lock().await.clone();
        let now = self.clock.now();

        let status = match connection.active_address() {
            Some(address) => {
                let last_active = match self.store.get().await {
                    Ok(Some(record)) if record.wallet_address == address => record.last_active,
                    _ => now,
                };
                SessionStatus::connected(address, last_active)
            }
            None => self.derive_disconnected(now, false).await,
        };

        self.publish(status)
    }

    /// Follow store changes made by other handles until `shutdown` fires.
    pub fn spawn_change_listener(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let mut changes = self.store.subscribe();
        let own_origin = self.store.origin();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Session change listener shutting down");
                        return;
                    }
                    change = changes.recv() => match change {
                        Ok(change) if change.origin == own_origin => {}
                        Ok(change) => {
                            debug!(kind = ?change.kind, "Session changed elsewhere, re-deriving");
                            self.refresh_from_store().await;
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Session change listener lagged, re-deriving");
                            self.refresh_from_store().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
            }
        })
    }

    async fn derive_disconnected(&self, now: DateTime<Utc>, may_delete: bool) -> SessionStatus {
        let record = match self.store.get().await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Failed to read session record, treating as absent");
                None
            }
        };

        let Some(record) = record else {
            return SessionStatus::disconnected(None);
        };

        if now - record.last_active < self.expiry {
            return SessionStatus::disconnected(Some(record.last_active));
        }

        // Only the pass that removes the record reports it as expired.
        if !may_delete {
            return SessionStatus::disconnected(None);
        }

        info!(
            wallet_address = %record.wallet_address,
            last_active = %record.last_active,
            "Session record expired, removing"
        );
        if let Err(e) = self.store.delete().await {
            warn!(error = %e, "Failed to remove expired session record");
        }
        SessionStatus::expired()
    }

    fn publish(&self, status: SessionStatus) -> SessionStatus {
        self.status.send_replace(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::InMemorySessionStore;
    use crate::session::SessionState;
    use crate::wallet::testing::FakeWallet;

    const ADDR: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-10-16T12:00:00Z".parse().unwrap()
    }

    fn tracker(store: &InMemorySessionStore) -> SessionTracker {
        SessionTracker::new(Arc::new(store.clone()))
            .with_clock(Arc::new(FixedClock(now())))
            .with_settle_delay(Duration::ZERO)
    }

    async fn seed(store: &InMemorySessionStore, address: &str, age: TimeDelta) {
        store
            .set(&SessionRecord {
                wallet_address: address.to_string(),
                last_active: now() - age,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn starts_loading() {
        let store = InMemorySessionStore::new();
        assert_eq!(tracker(&store).status().state, SessionState::Loading);
    }

    #[tokio::test]
    async fn connected_writes_record() {
        let store = InMemorySessionStore::new();
        let tracker = tracker(&store);

        let status = tracker.check(&ConnectionSnapshot::connected(ADDR)).await;
        assert_eq!(status, SessionStatus::connected(ADDR, now()));

        let stored = store.get().await.unwrap().unwrap();
        assert_eq!(stored.wallet_address, ADDR);
        assert_eq!(stored.last_active, now());
    }

    #[tokio::test]
    async fn fresh_record_surfaces_last_active_without_writing() {
        let store = InMemorySessionStore::new();
        seed(&store, ADDR, TimeDelta::hours(23)).await;
        let before = store.get().await.unwrap();

        let status = tracker(&store).check(&ConnectionSnapshot::disconnected()).await;
        assert_eq!(status.state, SessionState::Disconnected);
        assert_eq!(status.last_active, Some(now() - TimeDelta::hours(23)));
        assert!(!status.expired);
        assert_eq!(store.get().await.unwrap(), before);
    }

    #[tokio::test]
    async fn expired_record_is_deleted() {
        let store = InMemorySessionStore::new();
        seed(&store, "Addr1", TimeDelta::hours(25)).await;

        let status = tracker(&store).check(&ConnectionSnapshot::disconnected()).await;
        assert_eq!(status.state, SessionState::Disconnected);
        assert_eq!(status.last_active, None);
        assert!(status.expired);
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_exactly_at_expiry_counts_as_expired() {
        let store = InMemorySessionStore::new();
        seed(&store, ADDR, TimeDelta::hours(24)).await;

        let status = tracker(&store).check(&ConnectionSnapshot::disconnected()).await;
        assert!(status.expired);
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn no_record_is_plain_disconnected() {
        let store = InMemorySessionStore::new();
        let status = tracker(&store).check(&ConnectionSnapshot::disconnected()).await;
        assert_eq!(status, SessionStatus::disconnected(None));
    }

    #[tokio::test]
    async fn clear_removes_record() {
        let store = InMemorySessionStore::new();
        let tracker = tracker(&store);
        tracker.check(&ConnectionSnapshot::connected(ADDR)).await;

        let status = tracker.clear().await.unwrap();
        assert_eq!(status, SessionStatus::disconnected(None));
        assert_eq!(store.get().await.unwrap(), None);
        assert_eq!(tracker.status(), status);
    }

    #[tokio::test]
    async fn initialize_reads_wallet_connection() {
        let store = InMemorySessionStore::new();
        let tracker = tracker(&store);
        let wallet = FakeWallet::connected(ADDR.parse().unwrap());

        let status = tracker.initialize(&wallet).await;
        assert_eq!(status.state, SessionState::Connected);
        assert_eq!(status.wallet_address.as_deref(), Some(ADDR));
        assert_eq!(wallet.connect_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_waits_for_settle_delay() {
        let store = InMemorySessionStore::new();
        let tracker = tracker(&store).with_settle_delay(DEFAULT_SETTLE_DELAY);
        let wallet = FakeWallet::disconnected();
        let started = tokio::time::Instant::now();

        // The SDK restores its connection part-way through the settle window.
        let (status, ()) = tokio::join!(tracker.initialize(&wallet), async {
            tokio::time::sleep(DEFAULT_SETTLE_DELAY / 2).await;
            assert_eq!(tracker.status().state, SessionState::Loading);
            wallet.set_connected(true);
        });

        assert!(started.elapsed() >= DEFAULT_SETTLE_DELAY);
        assert_eq!(status.state, SessionState::Connected);
        assert_eq!(wallet.connect_calls(), 0);
    }

    #[tokio::test]
    async fn initialize_never_connects_for_returning_user() {
        let store = InMemorySessionStore::new();
        seed(&store, ADDR, TimeDelta::hours(1)).await;
        let tracker = tracker(&store);
        let wallet = FakeWallet::disconnected();

        let status = tracker.initialize(&wallet).await;
        assert_eq!(status.state, SessionState::Disconnected);
        assert!(status.last_active.is_some());
        assert_eq!(wallet.connect_calls(), 0);
    }

    #[tokio::test]
    async fn watchers_see_updates() {
        let store = InMemorySessionStore::new();
        let tracker = tracker(&store);
        let mut rx = tracker.watch();

        tracker.check(&ConnectionSnapshot::connected(ADDR)).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().state, SessionState::Connected);
    }

    #[tokio::test]
    async fn other_tab_sign_out_is_observed_without_writes() {
        let tab_a = InMemorySessionStore::new();
        let tab_b = tab_a.attach();

        let tracker_a = Arc::new(tracker(&tab_a));
        let tracker_b = Arc::new(tracker(&tab_b));

        // Tab A connects; tab B only knows it is disconnected locally.
        tracker_a.check(&ConnectionSnapshot::connected(ADDR)).await;
        tracker_b.check(&ConnectionSnapshot::disconnected()).await;
        assert_eq!(tracker_b.status().last_active, Some(now()));

        let shutdown = CancellationToken::new();
        let listener = Arc::clone(&tracker_b).spawn_change_listener(shutdown.clone());
        let mut rx_b = tracker_b.watch();

        tracker_a.clear().await.unwrap();
        rx_b.changed().await.unwrap();
        assert_eq!(*rx_b.borrow(), SessionStatus::disconnected(None));

        shutdown.cancel();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn listener_does_not_delete_expired_records() {
        let store = InMemorySessionStore::new();
        let tracker = Arc::new(tracker(&store.attach()));
        let shutdown = CancellationToken::new();
        let listener = Arc::clone(&tracker).spawn_change_listener(shutdown.clone());
        let mut rx = tracker.watch();

        seed(&store, ADDR, TimeDelta::hours(30)).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SessionStatus::disconnected(None));
        assert!(store.get().await.unwrap().is_some());

        shutdown.cancel();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn refresh_never_flags_expiry() {
        let store = InMemorySessionStore::new();
        seed(&store, ADDR, TimeDelta::hours(30)).await;
        let tracker = tracker(&store);

        let first = tracker.refresh_from_store().await;
        let second = tracker.refresh_from_store().await;
        assert_eq!(first, SessionStatus::disconnected(None));
        assert_eq!(second, SessionStatus::disconnected(None));
        assert!(store.get().await.unwrap().is_some());

        let status = tracker.check(&ConnectionSnapshot::disconnected()).await;
        assert!(status.expired);
        assert_eq!(store.get().await.unwrap(), None);
    }
}
