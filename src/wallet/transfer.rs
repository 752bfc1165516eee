// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SOL and USDC transfers through the wallet SDK.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{user_facing_message, FeeOptions, WalletConnection};
use crate::blockchain::{
    associated_token_address, format_amount, instructions, Asset, Instruction, NetworkConfig,
    Pubkey,
};
use crate::validation::{checked_address, checked_amount, AmountLimits};

/// A transfer as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Recipient wallet address (base58)
    pub recipient: String,
    /// Amount in display units (e.g. "1.5")
    pub amount: String,
    /// Asset to send
    pub asset: Asset,
}

/// Validated transfer with the instructions the SDK should sign.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PreparedTransfer {
    #[schema(value_type = String)]
    pub from: Pubkey,
    #[schema(value_type = String)]
    pub recipient: Pubkey,
    pub asset: Asset,
    /// Amount in base units
    pub amount_raw: u64,
    /// Amount in display units
    pub amount_formatted: String,
    pub instructions: Vec<Instruction>,
}

/// Outcome of a submitted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransferReceipt {
    pub signature: String,
    pub explorer_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet is busy with another operation")]
    Busy,

    #[error("{0}")]
    InvalidRecipient(String),

    #[error("{0}")]
    InvalidAmount(String),

    /// The SDK rejected or failed the transaction. `message` is safe to show.
    #[error("{message}")]
    Rejected { message: String, detail: String },
}

/// Validate a transfer and build its instructions.
///
/// SOL moves with a system transfer. USDC creates the recipient's associated
/// token account if needed, then moves tokens between the two accounts.
pub fn prepare_transfer(
    from: &Pubkey,
    request: &TransferRequest,
    limits: &AmountLimits,
    network: &NetworkConfig,
) -> Result<PreparedTransfer, TransferError> {
    let recipient = checked_address(&request.recipient).map_err(TransferError::InvalidRecipient)?;
    let amount = checked_amount(&request.amount, request.asset, limits)
        .map_err(TransferError::InvalidAmount)?;

    let instructions = match request.asset {
        Asset::Sol => vec![instructions::system_transfer(from, &recipient, amount)],
        Asset::Usdc => {
            let mint = network.usdc_mint;
            let source = associated_token_address(from, &mint);
            let destination = associated_token_address(&recipient, &mint);
            vec![
                instructions::create_associated_token_account_idempotent(from, &recipient, &mint),
                instructions::token_transfer_checked(
                    &source,
                    &mint,
                    &destination,
                    from,
                    amount,
                    Asset::Usdc.decimals(),
                ),
            ]
        }
    };

    Ok(PreparedTransfer {
        from: *from,
        recipient,
        asset: request.asset,
        amount_raw: amount,
        amount_formatted: format_amount(amount, request.asset.decimals()),
        instructions,
    })
}

/// Sends validated transfers through a connected wallet.
pub struct TransferService {
    wallet: Arc<dyn WalletConnection>,
    network: NetworkConfig,
    limits: AmountLimits,
    fee_options: FeeOptions,
    /// Append raw SDK errors to user-facing messages (development only)
    detailed_errors: bool,
}

impl TransferService {
    pub fn new(
        wallet: Arc<dyn WalletConnection>,
        network: NetworkConfig,
        limits: AmountLimits,
        fee_options: FeeOptions,
    ) -> Self {
        Self {
            wallet,
            network,
            limits,
            fee_options,
            detailed_errors: false,
        }
    }

    pub fn with_detailed_errors(mut self, detailed: bool) -> Self {
        self.detailed_errors = detailed;
        self
    }

    /// Validate, sign and submit a transfer.
    pub async fn send(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        if !self.wallet.is_connected() {
            return Err(TransferError::NotConnected);
        }
        let from = self.wallet.wallet_address().ok_or(TransferError::NotConnected)?;
        if self.wallet.is_busy() {
            return Err(TransferError::Busy);
        }

        let prepared = prepare_transfer(&from, request, &self.limits, &self.network)?;

        info!(
            from = %prepared.from,
            recipient = %prepared.recipient,
            asset = %prepared.asset,
            amount = %prepared.amount_formatted,
            "Submitting sponsored transfer"
        );

        let signature = self
            .wallet
            .sign_and_send(prepared.instructions, self.fee_options.clone())
            .await
            .map_err(|e| {
                warn!(error = %e, "Wallet SDK rejected transfer");
                TransferError::Rejected {
                    message: user_facing_message(&e.0, self.detailed_errors),
                    detail: e.0,
                }
            })?;

        info!(signature = %signature, "Transfer submitted");

        Ok(TransferReceipt {
            explorer_url: self.network.explorer_tx_url(&signature),
            signature,
        })
    }
}
