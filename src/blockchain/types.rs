// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// A 32-byte Solana account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether the bytes decode to a point on the ed25519 curve.
    ///
    /// Program-derived addresses are required to be off-curve so that no
    /// private key can exist for them.
    pub fn is_on_curve(&self) -> bool {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0).is_ok()
    }
}

impl FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParsePubkeyError::InvalidBase58)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| ParsePubkeyError::WrongLength(v.len()))?;
        Ok(Self(array))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors parsing a base58 address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePubkeyError {
    #[error("address is not valid base58")]
    InvalidBase58,

    #[error("address decodes to {0} bytes, expected 32")]
    WrongLength(usize),
}

/// System program, also the all-zero "reserved" address.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0; 32]);

/// SPL Token program (`TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`).
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133, 237,
    95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// Associated Token Account program (`ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`).
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    140, 151, 37, 143, 78, 36, 137, 241, 187, 61, 16, 41, 20, 142, 13, 131, 11, 90, 19, 153, 218,
    255, 16, 132, 4, 142, 123, 216, 219, 233, 248, 89,
]);

/// Circle USDC on devnet (`4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU`).
pub const USDC_MINT_DEVNET: Pubkey = Pubkey::new_from_array([
    59, 68, 44, 179, 145, 33, 87, 241, 58, 147, 61, 1, 52, 40, 45, 3, 43, 95, 254, 205, 1, 162,
    219, 241, 183, 121, 6, 8, 223, 0, 46, 167,
]);

/// Circle USDC on mainnet-beta (`EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v`).
pub const USDC_MINT_MAINNET: Pubkey = Pubkey::new_from_array([
    198, 250, 122, 243, 190, 219, 173, 58, 61, 101, 243, 106, 171, 201, 116, 49, 177, 187, 228,
    194, 210, 246, 224, 228, 124, 166, 2, 3, 69, 47, 93, 97,
]);

/// Solana cluster configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Cluster name ("devnet", "mainnet-beta")
    pub name: &'static str,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer base URL
    pub explorer_url: &'static str,
    /// USDC mint on this cluster
    pub usdc_mint: Pubkey,
}

pub const SOLANA_DEVNET: NetworkConfig = NetworkConfig {
    name: "devnet",
    rpc_url: "https://api.devnet.solana.com",
    explorer_url: "https://explorer.solana.com",
    usdc_mint: USDC_MINT_DEVNET,
};

pub const SOLANA_MAINNET: NetworkConfig = NetworkConfig {
    name: "mainnet-beta",
    rpc_url: "https://api.mainnet-beta.solana.com",
    explorer_url: "https://explorer.solana.com",
    usdc_mint: USDC_MINT_MAINNET,
};

impl NetworkConfig {
    /// Resolve a cluster by name. Accepts "mainnet" as an alias.
    pub fn by_name(name: &str) -> Option<NetworkConfig> {
        match name.trim().to_ascii_lowercase().as_str() {
            "devnet" => Some(SOLANA_DEVNET),
            "mainnet" | "mainnet-beta" => Some(SOLANA_MAINNET),
            _ => None,
        }
    }

    /// Explorer link for a transaction signature on this cluster.
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        if self.name == SOLANA_MAINNET.name {
            format!("{}/tx/{signature}", self.explorer_url)
        } else {
            format!("{}/tx/{signature}?cluster={}", self.explorer_url, self.name)
        }
    }
}

/// Assets the demo can hold and transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Sol,
    Usdc,
}

impl Asset {
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Sol => "SOL",
            Asset::Usdc => "USDC",
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Asset::Sol => 9,
            Asset::Usdc => 6,
        }
    }

    /// Base units per whole token (lamports per SOL, micro-USDC per USDC).
    pub fn base_units(&self) -> u64 {
        10u64.pow(self.decimals() as u32)
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOL" => Ok(Asset::Sol),
            "USDC" => Ok(Asset::Usdc),
            other => Err(format!("Unsupported asset `{other}`")),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Token balance information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TokenBalance {
    /// Token symbol ("SOL", "USDC")
    pub symbol: String,
    /// Balance in smallest unit (lamports or token base units)
    pub balance_raw: u64,
    /// Balance formatted with decimals
    pub balance_formatted: String,
    /// Number of decimals
    pub decimals: u8,
    /// Balance in display units
    pub ui_amount: f64,
}

impl TokenBalance {
    pub fn new(asset: Asset, raw: u64) -> Self {
        Self {
            symbol: asset.symbol().to_string(),
            balance_raw: raw,
            balance_formatted: super::format_amount(raw, asset.decimals()),
            decimals: asset.decimals(),
            ui_amount: raw as f64 / asset.base_units() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_their_base58_form() {
        assert_eq!(SYSTEM_PROGRAM_ID.to_string(), "11111111111111111111111111111111");
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_string(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
        assert_eq!(
            USDC_MINT_DEVNET.to_string(),
            "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU"
        );
        assert_eq!(
            USDC_MINT_MAINNET.to_string(),
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        );
    }

    #[test]
    fn parse_rejects_wrong_length_and_alphabet() {
        assert_eq!(
            "22222222222222222222222222222222".parse::<Pubkey>(),
            Err(ParsePubkeyError::WrongLength(23))
        );
        assert_eq!(
            "0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl".parse::<Pubkey>(),
            Err(ParsePubkeyError::InvalidBase58)
        );
    }

    #[test]
    fn pubkey_serde_uses_base58_string() {
        let key: Pubkey = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM\"");
        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn asset_parsing_is_case_insensitive() {
        assert_eq!("sol".parse::<Asset>(), Ok(Asset::Sol));
        assert_eq!(" USDC ".parse::<Asset>(), Ok(Asset::Usdc));
        assert!("ETH".parse::<Asset>().is_err());
        assert_eq!(Asset::Sol.base_units(), 1_000_000_000);
        assert_eq!(Asset::Usdc.base_units(), 1_000_000);
    }

    #[test]
    fn network_lookup() {
        assert_eq!(NetworkConfig::by_name("Devnet"), Some(SOLANA_DEVNET));
        assert_eq!(NetworkConfig::by_name("mainnet"), Some(SOLANA_MAINNET));
        assert_eq!(NetworkConfig::by_name("testnet"), None);
        assert_eq!(
            SOLANA_DEVNET.explorer_tx_url("abc"),
            "https://explorer.solana.com/tx/abc?cluster=devnet"
        );
        assert_eq!(
            SOLANA_MAINNET.explorer_tx_url("abc"),
            "https://explorer.solana.com/tx/abc"
        );
    }

    #[test]
    fn token_balance_display_units() {
        let sol = TokenBalance::new(Asset::Sol, 2_500_000_000);
        assert_eq!(sol.balance_formatted, "2.5");
        assert_eq!(sol.ui_amount, 2.5);

        let usdc = TokenBalance::new(Asset::Usdc, 0);
        assert_eq!(usdc.balance_formatted, "0");
        assert_eq!(usdc.ui_amount, 0.0);
    }
}
