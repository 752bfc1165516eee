// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana integration module.
//!
//! This module provides functionality for:
//! - Base58 addresses and program-derived addresses
//! - Querying native SOL and SPL token balances over JSON-RPC
//! - Exact conversion between display amounts and base units
//! - Building transfer instructions for the wallet SDK

pub mod address;
pub mod amount;
pub mod client;
pub mod instructions;
pub mod types;

pub use address::{associated_token_address, find_program_address};
pub use amount::{format_amount, parse_amount, AmountError};
pub use client::{BalanceSource, SolanaClientError, SolanaRpcClient};
pub use instructions::{AccountMeta, Instruction};
pub use types::*;
