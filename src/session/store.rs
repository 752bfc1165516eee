// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session record storage backends.
//!
//! Every backend holds at most one record and broadcasts a [`SessionChange`]
//! after each successful write. Handles created with `attach()` share the
//! same backend and notification channel but carry their own origin, which
//! is how two browser tabs observe each other.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::{SessionChange, SessionChangeKind, SessionError, SessionRecord, SESSION_KEY};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Key-value storage for the single session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the record. Malformed data reads as `None`.
    async fn get(&self) -> Result<Option<SessionRecord>, SessionError>;

    /// Create or overwrite the record.
    async fn set(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// Remove the record. Removing an absent record is not an error.
    async fn delete(&self) -> Result<(), SessionError>;

    /// Change notifications from every handle on this backend.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;

    /// Identity stamped on notifications made through this handle.
    fn origin(&self) -> Uuid;
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local store, for tests and ephemeral runs.
#[derive(Clone)]
pub struct InMemorySessionStore {
    record: Arc<RwLock<Option<SessionRecord>>>,
    changes: broadcast::Sender<SessionChange>,
    origin: Uuid,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            record: Arc::new(RwLock::new(None)),
            changes,
            origin: Uuid::new_v4(),
        }
    }

    /// Another handle on the same backend with its own origin.
    pub fn attach(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
            changes: self.changes.clone(),
            origin: Uuid::new_v4(),
        }
    }

    fn notify(&self, kind: SessionChangeKind) {
        // No subscribers is fine.
        let _ = self.changes.send(SessionChange {
            origin: self.origin,
            kind,
        });
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.record.read().await.clone())
    }

    async fn set(&self, record: &SessionRecord) -> Result<(), SessionError> {
        *self.record.write().await = Some(record.clone());
        self.notify(SessionChangeKind::Updated);
        Ok(())
    }

    async fn delete(&self) -> Result<(), SessionError> {
        let removed = self.record.write().await.take();
        if removed.is_some() {
            self.notify(SessionChangeKind::Cleared);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    fn origin(&self) -> Uuid {
        self.origin
    }
}

// =============================================================================
// File-backed
// =============================================================================

/// JSON file store under the data directory.
///
/// The record lives at `{data_dir}/{SESSION_KEY}.json` and is replaced
/// atomically (write to `.tmp`, then rename).
#[derive(Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    changes: broadcast::Sender<SessionChange>,
    origin: Uuid,
}

impl FileSessionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path: data_dir.as_ref().join(format!("{SESSION_KEY}.json")),
            changes,
            origin: Uuid::new_v4(),
        }
    }

    pub fn attach(&self) -> Self {
        Self {
            path: self.path.clone(),
            changes: self.changes.clone(),
            origin: Uuid::new_v4(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn notify(&self, kind: SessionChangeKind) {
        let _ = self.changes.send(SessionChange {
            origin: self.origin,
            kind,
        });
    }

    async fn discard_malformed(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != io::ErrorKind::NotFound {
                debug!(path = %self.path.display(), error = %e, "Failed to remove malformed session file");
            }
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<SessionRecord>, SessionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<SessionRecord>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Discarding malformed session record");
                self.discard_malformed().await;
                Ok(None)
            }
        }
    }

    async fn set(&self, record: &SessionRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(record)?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        self.notify(SessionChangeKind::Updated);
        Ok(())
    }

    async fn delete(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                self.notify(SessionChangeKind::Cleared);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    fn origin(&self) -> Uuid {
        self.origin
    }
}
