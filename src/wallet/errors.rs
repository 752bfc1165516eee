// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mapping of wallet SDK failures to short user-facing messages.

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Keyword table, checked in order against the lowercased error text.
const MESSAGE_TABLE: &[(&[&str], &str)] = &[
    (
        &["notallowederror", "not allowed", "cancel", "user rejected", "aborted"],
        "Passkey authentication was cancelled.",
    ),
    (
        &["insufficient"],
        "Insufficient balance to complete this transfer.",
    ),
    (
        &["timeout", "timed out"],
        "The request timed out. Please try again.",
    ),
    (
        &["blockhash", "expired"],
        "The transaction expired before it was confirmed. Please try again.",
    ),
    (
        &["paymaster", "fee payer", "sponsor"],
        "Fee sponsorship is unavailable right now. Please try again later.",
    ),
    (
        &["network", "failed to fetch", "connection refused", "econnrefused"],
        "Network error. Check your connection and try again.",
    ),
];

/// Short message for a raw SDK error.
///
/// With `detailed` set (development mode) the raw text is appended so the
/// original failure stays visible.
pub fn user_facing_message(raw: &str, detailed: bool) -> String {
    let lowered = raw.to_lowercase();
    let message = MESSAGE_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, message)| *message)
        .unwrap_or(GENERIC_MESSAGE);

    if detailed && !raw.trim().is_empty() {
        format!("{message} ({})", raw.trim())
    } else {
        message.to_string()
    }
}
