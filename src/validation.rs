// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recipient address and transfer amount validation.
//!
//! Validators never fail for bad input; they return a [`ValidationResult`]
//! carrying a message that can be shown to the user as-is. Nothing that fails
//! here is ever forwarded to the wallet SDK.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{
    format_amount, parse_amount, AmountError, Asset, Pubkey, SYSTEM_PROGRAM_ID,
};

/// Shortest base58 encoding of a 32-byte address.
pub const MIN_ADDRESS_LEN: usize = 32;
/// Longest base58 encoding of a 32-byte address.
pub const MAX_ADDRESS_LEN: usize = 44;

/// Largest integer the browser SDK carries without precision loss (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Default per-transfer ceiling for SOL, in whole tokens.
pub const DEFAULT_MAX_SOL: u64 = 1_000_000;
/// Default per-transfer ceiling for USDC, in whole tokens.
pub const DEFAULT_MAX_USDC: u64 = 10_000_000;

/// Outcome of validating a single input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid { reason: String },
}

impl ValidationResult {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { reason } => Some(reason),
        }
    }
}

impl<T> From<Result<T, String>> for ValidationResult {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(_) => ValidationResult::Valid,
            Err(reason) => ValidationResult::Invalid { reason },
        }
    }
}

/// Wire form of a [`ValidationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        match result {
            ValidationResult::Valid => Self {
                valid: true,
                reason: None,
            },
            ValidationResult::Invalid { reason } => Self {
                valid: false,
                reason: Some(reason),
            },
        }
    }
}

/// Per-asset transfer ceilings, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountLimits {
    pub max_sol: u64,
    pub max_usdc: u64,
}

impl AmountLimits {
    /// Limits from whole-token ceilings.
    pub fn from_whole_tokens(max_sol: u64, max_usdc: u64) -> Self {
        Self {
            max_sol: max_sol.saturating_mul(Asset::Sol.base_units()),
            max_usdc: max_usdc.saturating_mul(Asset::Usdc.base_units()),
        }
    }

    pub fn ceiling(&self, asset: Asset) -> u64 {
        match asset {
            Asset::Sol => self.max_sol,
            Asset::Usdc => self.max_usdc,
        }
    }
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self::from_whole_tokens(DEFAULT_MAX_SOL, DEFAULT_MAX_USDC)
    }
}

/// Parse a recipient address, or explain why it is unusable.
pub fn checked_address(input: &str) -> Result<Pubkey, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Recipient address is required".to_string());
    }

    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&trimmed.chars().count()) {
        return Err(format!(
            "Address must be between {MIN_ADDRESS_LEN} and {MAX_ADDRESS_LEN} characters"
        ));
    }

    let address: Pubkey = trimmed
        .parse()
        .map_err(|_| "Invalid address format".to_string())?;

    if address == SYSTEM_PROGRAM_ID {
        return Err("Cannot send to the system program address".to_string());
    }

    Ok(address)
}

/// Validate a recipient address.
pub fn validate_address(input: &str) -> ValidationResult {
    checked_address(input).into()
}

/// Parse a transfer amount into base units, or explain why it is unusable.
pub fn checked_amount(input: &str, asset: Asset, limits: &AmountLimits) -> Result<u64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Amount is required".to_string());
    }

    // A leading sign is never valid, but "-1" deserves a better message than
    // "not a number".
    if let Some(rest) = trimmed.strip_prefix('-') {
        return match parse_amount(rest, asset.decimals()) {
            Ok(_) | Err(AmountError::TooManyDecimals(_)) | Err(AmountError::Overflow) => {
                Err("Amount must be greater than 0".to_string())
            }
            Err(_) => Err("Amount must be a valid number".to_string()),
        };
    }

    let raw = match parse_amount(trimmed, asset.decimals()) {
        Ok(raw) => raw,
        Err(AmountError::Empty) | Err(AmountError::NotANumber) => {
            return Err("Amount must be a valid number".to_string());
        }
        Err(AmountError::TooManyDecimals(decimals)) => {
            return Err(format!(
                "{} supports at most {decimals} decimal places",
                asset.symbol()
            ));
        }
        Err(AmountError::Overflow) => {
            return Err("Amount is too large to process safely".to_string());
        }
    };

    if raw == 0 {
        return Err("Amount must be greater than 0".to_string());
    }

    let ceiling = limits.ceiling(asset);
    if raw > ceiling {
        return Err(format!(
            "Maximum amount is {} {}",
            format_amount(ceiling, asset.decimals()),
            asset.symbol()
        ));
    }

    if raw > MAX_SAFE_INTEGER {
        return Err("Amount is too large to process safely".to_string());
    }

    Ok(raw)
}

/// Validate a transfer amount for `asset` against `limits`.
pub fn validate_amount(input: &str, asset: Asset, limits: &AmountLimits) -> ValidationResult {
    checked_amount(input, asset, limits).into()
}
