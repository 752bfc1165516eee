// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Passkey Wallet Companion - Solana session, validation and balance service
//!
//! Backs a passkey-based Solana wallet front end. Passkey ceremonies, smart
//! wallet deployment and paymaster relaying stay in the external wallet SDK.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `balance` - SOL/USDC balance fetching and polling
//! - `blockchain` - Solana addresses, amounts, instructions and JSON-RPC
//! - `session` - Wallet session tracking with 24-hour expiry
//! - `validation` - Recipient address and amount validation
//! - `wallet` - Wallet SDK boundary and sponsored transfers

pub mod api;
pub mod balance;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod validation;
pub mod wallet;
