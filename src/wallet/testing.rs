// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process wallet double for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FeeOptions, WalletConnection, WalletError};
use crate::blockchain::{Instruction, Pubkey};

pub struct FakeWallet {
    address: Pubkey,
    connected: AtomicBool,
    busy: AtomicBool,
    connect_calls: AtomicUsize,
    next_failure: Mutex<Option<WalletError>>,
    sent: Mutex<Vec<(Vec<Instruction>, FeeOptions)>>,
}

impl FakeWallet {
    fn with_state(address: Pubkey, connected: bool) -> Self {
        Self {
            address,
            connected: AtomicBool::new(connected),
            busy: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            next_failure: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn connected(address: Pubkey) -> Self {
        Self::with_state(address, true)
    }

    pub fn disconnected() -> Self {
        Self::with_state(Pubkey::new_from_array([7; 32]), false)
    }

    /// Change the connection state without counting a `connect` call.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn fail_next_send(&self, error: WalletError) {
        *self.next_failure.lock().unwrap() = Some(error);
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Everything passed to `sign_and_send` that was accepted.
    pub fn sent(&self) -> Vec<(Vec<Instruction>, FeeOptions)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletConnection for FakeWallet {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn wallet_address(&self) -> Option<Pubkey> {
        self.is_connected().then_some(self.address)
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.address)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_and_send(
        &self,
        instructions: Vec<Instruction>,
        fee_options: FeeOptions,
    ) -> Result<String, WalletError> {
        if let Some(error) = self.next_failure.lock().unwrap().take() {
            return Err(error);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((instructions, fee_options));
        Ok(format!("fake-signature-{}", sent.len()))
    }
}
