// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet SDK boundary and fee-sponsored transfers.
//!
//! Passkey authentication, smart wallet deployment and paymaster relaying all
//! happen inside the external wallet SDK. This module only describes what the
//! service reads from it and calls on it ([`WalletConnection`]), and prepares
//! validated transfer instructions for it to sign.

pub mod errors;
pub mod transfer;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{Instruction, Pubkey};

pub use errors::user_facing_message;
pub use transfer::{
    prepare_transfer, PreparedTransfer, TransferError, TransferReceipt, TransferRequest,
    TransferService,
};

/// Opaque failure reported by the wallet SDK.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct WalletError(pub String);

/// How the paymaster should sponsor a transaction's fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeeOptions {
    /// Fee sponsorship relay endpoint
    pub paymaster_url: String,
    /// Mint the sponsored fee is charged in; `None` charges SOL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub fee_token: Option<Pubkey>,
}

impl FeeOptions {
    pub fn sponsored(paymaster_url: impl Into<String>, fee_token: Option<Pubkey>) -> Self {
        Self {
            paymaster_url: paymaster_url.into(),
            fee_token,
        }
    }
}

/// Connection context exposed by the wallet SDK.
#[async_trait]
pub trait WalletConnection: Send + Sync {
    fn is_connected(&self) -> bool;

    /// An operation (connect, sign) is in flight.
    fn is_busy(&self) -> bool;

    /// Smart wallet address of the connected user.
    fn wallet_address(&self) -> Option<Pubkey>;

    /// Run the passkey ceremony and establish a session.
    async fn connect(&self) -> Result<Pubkey, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Sign `instructions` with the passkey and submit them through the
    /// paymaster. Returns the transaction signature.
    async fn sign_and_send(
        &self,
        instructions: Vec<Instruction>,
        fee_options: FeeOptions,
    ) -> Result<String, WalletError>;
}
