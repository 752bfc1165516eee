// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Values are
//! trimmed and empty values fall back to the default.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SOLANA_RPC_URL` | Solana JSON-RPC endpoint | `https://api.devnet.solana.com` |
//! | `PORTAL_URL` | Passkey portal used by the wallet SDK | `https://portal.lazor.sh` |
//! | `PAYMASTER_URL` | Fee sponsorship relay | `https://kora.devnet.lazorkit.com` |
//! | `SOLANA_NETWORK` | Cluster (`devnet` or `mainnet-beta`) | `devnet` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the session record | `./data` |
//! | `MAX_SOL_AMOUNT` | Largest SOL transfer, whole tokens | `1000000` |
//! | `MAX_USDC_AMOUNT` | Largest USDC transfer, whole tokens | `10000000` |
//! | `BALANCE_POLL_INTERVAL_SECS` | Balance refresh interval | `30` |
//! | `MAX_WATCHED_WALLETS` | Wallets polled at once | `16` |
//! | `APP_ENV` | `development` shows raw error detail | `production` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::balance::DEFAULT_MAX_WATCHED;
use crate::blockchain::{NetworkConfig, SOLANA_DEVNET};
use crate::validation::{AmountLimits, DEFAULT_MAX_SOL, DEFAULT_MAX_USDC};
use crate::wallet::FeeOptions;

pub const SOLANA_RPC_URL_ENV: &str = "SOLANA_RPC_URL";
pub const PORTAL_URL_ENV: &str = "PORTAL_URL";
pub const PAYMASTER_URL_ENV: &str = "PAYMASTER_URL";
pub const SOLANA_NETWORK_ENV: &str = "SOLANA_NETWORK";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
/// Directory for the persisted session record. Created on startup if missing.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const MAX_SOL_AMOUNT_ENV: &str = "MAX_SOL_AMOUNT";
pub const MAX_USDC_AMOUNT_ENV: &str = "MAX_USDC_AMOUNT";
pub const BALANCE_POLL_INTERVAL_ENV: &str = "BALANCE_POLL_INTERVAL_SECS";
pub const MAX_WATCHED_WALLETS_ENV: &str = "MAX_WATCHED_WALLETS";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_PORTAL_URL: &str = "https://portal.lazor.sh";
pub const DEFAULT_PAYMASTER_URL: &str = "https://kora.devnet.lazorkit.com";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("{var} must be {expected}, got `{value}`")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("unknown Solana network `{0}` (expected devnet or mainnet-beta)")]
    UnknownNetwork(String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rpc_url: String,
    pub portal_url: String,
    pub paymaster_url: String,
    pub network: NetworkConfig,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Whole-token transfer ceilings, as configured
    pub max_sol_amount: u64,
    pub max_usdc_amount: u64,
    pub poll_interval: Duration,
    pub max_watched_wallets: usize,
    pub development: bool,
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_optional)
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let network_name = get(SOLANA_NETWORK_ENV, SOLANA_DEVNET.name);
        let network = NetworkConfig::by_name(&network_name)
            .ok_or(ConfigError::UnknownNetwork(network_name))?;

        let rpc_url = checked_url(SOLANA_RPC_URL_ENV, get(SOLANA_RPC_URL_ENV, DEFAULT_RPC_URL))?;
        let portal_url = checked_url(PORTAL_URL_ENV, get(PORTAL_URL_ENV, DEFAULT_PORTAL_URL))?;
        let paymaster_url =
            checked_url(PAYMASTER_URL_ENV, get(PAYMASTER_URL_ENV, DEFAULT_PAYMASTER_URL))?;

        let port = parsed(PORT_ENV, &get(PORT_ENV, &DEFAULT_PORT.to_string()), "a port number")?;
        let max_sol_amount = positive(
            MAX_SOL_AMOUNT_ENV,
            &get(MAX_SOL_AMOUNT_ENV, &DEFAULT_MAX_SOL.to_string()),
        )?;
        let max_usdc_amount = positive(
            MAX_USDC_AMOUNT_ENV,
            &get(MAX_USDC_AMOUNT_ENV, &DEFAULT_MAX_USDC.to_string()),
        )?;
        let poll_secs = positive(
            BALANCE_POLL_INTERVAL_ENV,
            &get(BALANCE_POLL_INTERVAL_ENV, &DEFAULT_POLL_INTERVAL_SECS.to_string()),
        )?;
        let max_watched_wallets = positive(
            MAX_WATCHED_WALLETS_ENV,
            &get(MAX_WATCHED_WALLETS_ENV, &DEFAULT_MAX_WATCHED.to_string()),
        )?;

        Ok(Self {
            rpc_url,
            portal_url,
            paymaster_url,
            network,
            host: get(HOST_ENV, DEFAULT_HOST),
            port,
            data_dir: PathBuf::from(get(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            max_sol_amount,
            max_usdc_amount,
            poll_interval: Duration::from_secs(poll_secs),
            max_watched_wallets: usize::try_from(max_watched_wallets).unwrap_or(usize::MAX),
            development: get(APP_ENV_ENV, "production").eq_ignore_ascii_case("development"),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: HOST_ENV,
                value: self.host.clone(),
                expected: "an IP address",
            })
    }

    pub fn amount_limits(&self) -> AmountLimits {
        AmountLimits::from_whole_tokens(self.max_sol_amount, self.max_usdc_amount)
    }

    /// Paymaster sponsorship, with fees charged in the cluster's USDC.
    pub fn fee_options(&self) -> FeeOptions {
        FeeOptions::sponsored(self.paymaster_url.clone(), Some(self.network.usdc_mint))
    }

    /// Raw SDK error text is shown only in development.
    pub fn detailed_errors(&self) -> bool {
        self.development || cfg!(feature = "dev")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            paymaster_url: DEFAULT_PAYMASTER_URL.to_string(),
            network: SOLANA_DEVNET,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_sol_amount: DEFAULT_MAX_SOL,
            max_usdc_amount: DEFAULT_MAX_USDC,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_watched_wallets: DEFAULT_MAX_WATCHED,
            development: false,
        }
    }
}

/// Trimmed, non-empty environment variable.
pub fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

pub fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

fn checked_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    url::Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })?;
    Ok(value)
}

fn parsed<T>(var: &'static str, value: &str, expected: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        expected,
    })
}

fn positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match parsed::<u64>(var, value, "a positive integer")? {
        0 => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            expected: "a positive integer",
        }),
        n => Ok(n),
    }
}
