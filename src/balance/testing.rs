// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::blockchain::{BalanceSource, Pubkey, SolanaClientError};

/// Scriptable balance source.
pub struct FakeSource {
    lamports: AtomicU64,
    token: Mutex<Option<u64>>,
    fail_native: AtomicBool,
    fail_token: AtomicBool,
    delay: Mutex<Duration>,
    native_calls: AtomicUsize,
    token_accounts: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(lamports: u64, token: Option<u64>) -> Self {
        Self {
            lamports: AtomicU64::new(lamports),
            token: Mutex::new(token),
            fail_native: AtomicBool::new(false),
            fail_token: AtomicBool::new(false),
            delay: Mutex::new(Duration::ZERO),
            native_calls: AtomicUsize::new(0),
            token_accounts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_native(&self, lamports: u64) {
        self.lamports.store(lamports, Ordering::SeqCst);
    }

    pub fn fail_native(&self, fail: bool) {
        self.fail_native.store(fail, Ordering::SeqCst);
    }

    pub fn fail_token(&self, fail: bool) {
        self.fail_token.store(fail, Ordering::SeqCst);
    }

    /// Delay every native balance response.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn native_calls(&self) -> usize {
        self.native_calls.load(Ordering::SeqCst)
    }

    pub fn token_accounts_queried(&self) -> Vec<String> {
        self.token_accounts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceSource for FakeSource {
    async fn native_balance(&self, _owner: &Pubkey) -> Result<u64, SolanaClientError> {
        self.native_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_native.load(Ordering::SeqCst) {
            return Err(SolanaClientError::Http("connection refused".into()));
        }
        Ok(self.lamports.load(Ordering::SeqCst))
    }

    async fn token_account_balance(
        &self,
        account: &Pubkey,
    ) -> Result<Option<u64>, SolanaClientError> {
        self.token_accounts.lock().unwrap().push(account.to_string());
        if self.fail_token.load(Ordering::SeqCst) {
            return Err(SolanaClientError::Rpc {
                code: -32603,
                message: "internal error".into(),
            });
        }
        Ok(*self.token.lock().unwrap())
    }
}
