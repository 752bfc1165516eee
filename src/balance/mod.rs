// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balances
//!
//! Native SOL and USDC balances for a wallet, fetched on demand
//! ([`BalanceFetcher`]) or kept fresh by a background poller
//! ([`BalancePoller`]).
//!
//! ## Polling
//!
//! A poller fetches once on start, then every interval (30 s by default)
//! until its [`PollHandle`] is stopped or dropped. Each pass publishes a
//! [`BalanceState`] on a `watch` channel. Failed passes keep the last good
//! balances and record the error. Results that land after the poller was
//! stopped are discarded.

pub mod fetcher;
pub mod poller;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{Pubkey, TokenBalance};

pub use fetcher::BalanceFetcher;
pub use poller::{
    BalancePoller, PollHandle, PollerRegistry, DEFAULT_MAX_WATCHED, DEFAULT_POLL_INTERVAL,
};

/// Balances of one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Balances {
    /// Wallet address
    #[schema(value_type = String)]
    pub address: Pubkey,
    /// Cluster name ("devnet", "mainnet-beta")
    pub network: String,
    pub sol: TokenBalance,
    pub usdc: TokenBalance,
}

/// Snapshot published by a poller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct BalanceState {
    /// Last successfully fetched balances
    pub balances: Option<Balances>,
    /// A fetch is in flight
    pub loading: bool,
    /// Error from the most recent pass, cleared on success
    pub error: Option<String>,
    /// When `balances` was last refreshed
    pub updated_at: Option<DateTime<Utc>>,
}

impl BalanceState {
    /// State for a one-shot fetch.
    pub fn fetched(balances: Balances) -> Self {
        Self {
            balances: Some(balances),
            loading: false,
            error: None,
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// Neither balance could be read.
    #[error("Balances unavailable: {0}")]
    Unavailable(String),

    /// The registry already polls its maximum number of wallets.
    #[error("Too many wallets are being watched (limit {limit})")]
    WatchLimit { limit: usize },
}
