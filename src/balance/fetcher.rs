// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::{debug, warn};

use super::{BalanceError, Balances};
use crate::blockchain::{
    associated_token_address, Asset, BalanceSource, NetworkConfig, Pubkey, TokenBalance,
};

/// Reads native SOL and USDC balances for a wallet.
#[derive(Clone)]
pub struct BalanceFetcher {
    source: Arc<dyn BalanceSource>,
    network: NetworkConfig,
}

impl BalanceFetcher {
    pub fn new(source: Arc<dyn BalanceSource>, network: NetworkConfig) -> Self {
        Self { source, network }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Fetch both balances concurrently.
    ///
    /// Both queries always run to completion. A side that fails reports 0;
    /// the call fails only when neither side succeeded.
    pub async fn fetch(&self, owner: &Pubkey) -> Result<Balances, BalanceError> {
        let token_account = associated_token_address(owner, &self.network.usdc_mint);

        let (sol, usdc) = tokio::join!(
            self.source.native_balance(owner),
            self.source.token_account_balance(&token_account),
        );

        let (sol, usdc) = match (sol, usdc) {
            (Err(sol_err), Err(usdc_err)) => {
                warn!(
                    owner = %owner,
                    sol_error = %sol_err,
                    usdc_error = %usdc_err,
                    "Balance fetch failed"
                );
                return Err(BalanceError::Unavailable(sol_err.to_string()));
            }
            (sol, usdc) => (
                sol.unwrap_or_else(|e| {
                    warn!(owner = %owner, error = %e, "SOL balance unavailable, reporting 0");
                    0
                }),
                usdc.unwrap_or_else(|e| {
                    warn!(owner = %owner, error = %e, "USDC balance unavailable, reporting 0");
                    None
                }),
            ),
        };

        if usdc.is_none() {
            debug!(owner = %owner, token_account = %token_account, "No USDC token account");
        }

        Ok(Balances {
            address: *owner,
            network: self.network.name.to_string(),
            sol: TokenBalance::new(Asset::Sol, sol),
            usdc: TokenBalance::new(Asset::Usdc, usdc.unwrap_or(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::testing::FakeSource;
    use crate::blockchain::SOLANA_DEVNET;

    const OWNER: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn fetcher(source: FakeSource) -> (BalanceFetcher, Arc<FakeSource>) {
        let source = Arc::new(source);
        (BalanceFetcher::new(source.clone(), SOLANA_DEVNET), source)
    }

    #[tokio::test]
    async fn formats_both_balances() {
        let (fetcher, _) = fetcher(FakeSource::new(2_500_000_000, Some(12_340_000)));
        let balances = fetcher.fetch(&OWNER.parse().unwrap()).await.unwrap();

        assert_eq!(balances.address.to_string(), OWNER);
        assert_eq!(balances.network, "devnet");
        assert_eq!(balances.sol.balance_formatted, "2.5");
        assert_eq!(balances.sol.ui_amount, 2.5);
        assert_eq!(balances.usdc.balance_raw, 12_340_000);
        assert_eq!(balances.usdc.balance_formatted, "12.34");
    }

    #[tokio::test]
    async fn queries_the_owner_usdc_account() {
        let (fetcher, source) = fetcher(FakeSource::new(0, Some(1)));
        fetcher.fetch(&OWNER.parse().unwrap()).await.unwrap();

        assert_eq!(
            source.token_accounts_queried(),
            vec!["HwpBSwuyVKJi7d9kqqNexc54MS9i4BEDKDVDLeUVjZm8".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_token_account_is_zero() {
        let (fetcher, _) = fetcher(FakeSource::new(1_000_000_000, None));
        let balances = fetcher.fetch(&OWNER.parse().unwrap()).await.unwrap();

        assert_eq!(balances.sol.balance_formatted, "1");
        assert_eq!(balances.usdc.balance_raw, 0);
        assert_eq!(balances.usdc.balance_formatted, "0");
    }

    #[tokio::test]
    async fn one_failed_side_reports_zero() {
        let source = FakeSource::new(5, Some(7_000_000));
        source.fail_native(true);
        let (fetcher, source) = fetcher(source);

        let balances = fetcher.fetch(&OWNER.parse().unwrap()).await.unwrap();
        assert_eq!(balances.sol.balance_raw, 0);
        assert_eq!(balances.usdc.balance_formatted, "7");

        source.fail_native(false);
        source.fail_token(true);
        let balances = fetcher.fetch(&OWNER.parse().unwrap()).await.unwrap();
        assert_eq!(balances.sol.balance_raw, 5);
        assert_eq!(balances.usdc.balance_raw, 0);
    }

    #[tokio::test]
    async fn both_sides_failing_is_an_error() {
        let source = FakeSource::new(5, Some(5));
        source.fail_native(true);
        source.fail_token(true);
        let (fetcher, _) = fetcher(source);

        let err = fetcher.fetch(&OWNER.parse().unwrap()).await.unwrap_err();
        assert!(matches!(err, BalanceError::Unavailable(_)));
    }
}
