//! Periodic profit withdrawal from the flash-loan vehicle.
//!
//! Liquidation profit accumulates inside the vehicle contract, typically as
//! interest-bearing aTokens. The sweeper periodically redeems and withdraws
//! those balances to the owner wallet. Only meaningful alongside flash-loan
//! execution; the binary starts this loop only when both flags are enabled.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use aave_liquidator_chain::{wait_for_confirmation, ChainClient, FlashLoanVehicle};

use crate::config::MonitorConfig;
use crate::error::ExecutionError;

/// Sweeps accumulated vehicle balances back to the owner wallet.
pub struct ProfitSweeper {
    client: Arc<dyn ChainClient>,
    vehicle: Arc<dyn FlashLoanVehicle>,
    wallet_address: Address,
    config: Arc<MonitorConfig>,
}

impl ProfitSweeper {
    /// Create a sweeper.
    pub fn new(
        client: Arc<dyn ChainClient>,
        vehicle: Arc<dyn FlashLoanVehicle>,
        wallet_address: Address,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            client,
            vehicle,
            wallet_address,
            config,
        }
    }

    /// Run the withdrawal loop until cancelled. The first sweep happens
    /// immediately; subsequent sweeps follow the configured interval.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.config.withdraw_interval.as_secs(),
            "Starting automatic profit withdrawal"
        );

        let mut ticker = interval(self.config.withdraw_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Profit withdrawal stopped");
                    return;
                }
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(_) => {}
                        Err(e @ ExecutionError::NotOwner { .. }) => {
                            // Authorization failure: refuse to operate, but
                            // keep the loop alive for the next interval
                            error!(error = %e, "Withdrawal refused");
                        }
                        Err(e) => {
                            warn!(error = %e, "Withdrawal round failed");
                        }
                    }
                }
            }
        }
    }

    /// One withdrawal round over the configured token list.
    ///
    /// Returns the total withdrawn across tokens. Per-token failures are
    /// logged and skipped; only an owner mismatch or an owner-lookup error
    /// aborts the round.
    pub async fn sweep_once(&self) -> Result<U256, ExecutionError> {
        let owner = self.vehicle.owner().await?;
        if owner != self.wallet_address {
            return Err(ExecutionError::NotOwner {
                owner,
                caller: self.wallet_address,
            });
        }

        let default_tokens = [self.config.default_collateral_asset];
        let tokens: &[Address] = if self.config.withdraw_tokens.is_empty() {
            &default_tokens
        } else {
            &self.config.withdraw_tokens
        };

        debug!(token_count = tokens.len(), "Checking vehicle balances for withdrawal");

        let mut total_withdrawn = U256::ZERO;

        for &token in tokens {
            let balance = match self.vehicle.balance_of(token).await {
                Ok(balance) => balance,
                Err(e) => {
                    warn!(token = %token, error = %e, "Could not read vehicle balance");
                    continue;
                }
            };

            if balance.is_zero() {
                continue;
            }
            if balance < self.config.min_withdraw_amount {
                debug!(
                    token = %token,
                    balance = %balance,
                    minimum = %self.config.min_withdraw_amount,
                    "Balance below minimum, skipping"
                );
                continue;
            }

            info!(token = %token, balance = %balance, "Withdrawing vehicle balance");

            // Redeem as aToken first; plain withdrawal is the fallback for
            // tokens the vehicle holds directly
            let tx_hash = match self.vehicle.withdraw_interest_bearing(token).await {
                Ok(hash) => hash,
                Err(e) => {
                    info!(token = %token, error = %e, "aToken withdrawal failed, trying plain withdrawal");
                    match self.vehicle.withdraw_underlying(token).await {
                        Ok(hash) => hash,
                        Err(e) => {
                            warn!(token = %token, error = %e, "Withdrawal submission failed");
                            continue;
                        }
                    }
                }
            };

            match wait_for_confirmation(&*self.client, tx_hash, &self.config.confirmation).await {
                Ok(receipt) => {
                    info!(
                        token = %token,
                        tx_hash = %tx_hash,
                        block = receipt.block_number,
                        amount = %balance,
                        "Withdrawal confirmed"
                    );
                    total_withdrawn += balance;
                }
                Err(e) => {
                    warn!(token = %token, tx_hash = %tx_hash, error = %e, "Withdrawal not confirmed");
                }
            }
        }

        if total_withdrawn.is_zero() {
            info!("No profits to withdraw this round");
        } else {
            info!(total = %total_withdrawn, "Profits withdrawn");
        }

        Ok(total_withdrawn)
    }
}
