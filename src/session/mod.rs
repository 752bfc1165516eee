// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Tracking
//!
//! Remembers which wallet last connected so a returning user can be offered
//! a "welcome back" reconnect without the service ever prompting for a
//! passkey on its own.
//!
//! ## Model
//!
//! - A single [`SessionRecord`] lives in a [`SessionStore`] under a fixed key.
//! - The [`SessionTracker`] derives a [`SessionStatus`] from the wallet SDK's
//!   connection flag and the age of that record, once per check.
//! - Records older than [`SESSION_EXPIRY_HOURS`] are deleted on sight.
//! - Stores broadcast a [`SessionChange`] on every write so other trackers
//!   sharing the backend re-derive their status without writing.

pub mod store;
pub mod tracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};
pub use tracker::{Clock, SessionTracker, SystemClock};

/// Sessions idle for this long are forgotten.
pub const SESSION_EXPIRY_HOURS: i64 = 24;

/// Fixed storage key for the session record.
pub const SESSION_KEY: &str = "passkey_wallet_session";

/// Persisted marker of the last successful connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub wallet_address: String,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Loading,
    Connected,
    Disconnected,
}

/// Result of one derive pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionStatus {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Last activity of a remembered session, for the "welcome back" prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    /// Set on the pass that discarded an expired record.
    #[serde(default)]
    pub expired: bool,
}

impl SessionStatus {
    pub fn loading() -> Self {
        Self {
            state: SessionState::Loading,
            wallet_address: None,
            last_active: None,
            expired: false,
        }
    }

    pub fn connected(wallet_address: impl Into<String>, last_active: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::Connected,
            wallet_address: Some(wallet_address.into()),
            last_active: Some(last_active),
            expired: false,
        }
    }

    pub fn disconnected(last_active: Option<DateTime<Utc>>) -> Self {
        Self {
            state: SessionState::Disconnected,
            wallet_address: None,
            last_active,
            expired: false,
        }
    }

    pub fn expired() -> Self {
        Self {
            expired: true,
            ..Self::disconnected(None)
        }
    }
}

/// What the wallet SDK reports about its connection right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionSnapshot {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl ConnectionSnapshot {
    pub fn connected(wallet_address: impl Into<String>) -> Self {
        Self {
            connected: true,
            wallet_address: Some(wallet_address.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The wallet address, only when the SDK reports a live connection.
    pub fn active_address(&self) -> Option<&str> {
        if self.connected {
            self.wallet_address.as_deref().filter(|a| !a.is_empty())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChangeKind {
    Updated,
    Cleared,
}

/// Change notification broadcast by a store after each write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionChange {
    /// Identity of the store handle that made the change.
    pub origin: Uuid,
    pub kind: SessionChangeKind,
}

/// Errors reading or writing the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
