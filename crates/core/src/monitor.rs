//! Health factor monitoring loop.
//!
//! One sequential pass over every tracked address per tick. Rounds are
//! driven by a single ticker and the pass runs to completion before the next
//! tick fires, so rounds never overlap. A failing address is skipped for the
//! round; it stays tracked and is retried next tick.

use std::sync::Arc;

use alloy::primitives::Address;
use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use aave_liquidator_chain::{ChainClient, ChainError, LendingPool};

use crate::config::MonitorConfig;
use crate::executor::LiquidationExecutor;
use crate::math::ray_to_decimal;
use crate::position::LiquidationOpportunity;
use crate::profitability::{self, ProfitCalculation};
use crate::registry::PositionRegistry;

/// Periodically refreshes tracked positions and reacts to insolvency.
pub struct HealthMonitor {
    client: Arc<dyn ChainClient>,
    pool: Arc<dyn LendingPool>,
    registry: Arc<PositionRegistry>,
    executor: Arc<LiquidationExecutor>,
    config: Arc<MonitorConfig>,
}

impl HealthMonitor {
    /// Create a monitor.
    pub fn new(
        client: Arc<dyn ChainClient>,
        pool: Arc<dyn LendingPool>,
        registry: Arc<PositionRegistry>,
        executor: Arc<LiquidationExecutor>,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            client,
            pool,
            registry,
            executor,
            config,
        }
    }

    /// Run the monitoring loop until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "Starting health factor monitoring"
        );

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Health monitoring stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_round().await;
                }
            }
        }
    }

    /// One full pass over the tracked addresses.
    ///
    /// Returns the number of liquidation opportunities detected this round.
    pub async fn run_round(&self) -> usize {
        let current_block = match self.client.block_number().await {
            Ok(block) => block,
            Err(e) => {
                warn!(error = %e, "Monitor round: failed to get current block");
                return 0;
            }
        };

        let addresses = self.registry.addresses();
        if addresses.is_empty() {
            info!("No addresses to monitor yet");
            return 0;
        }

        debug!(count = addresses.len(), current_block, "Checking health factors");

        let mut opportunities = 0;
        for user in addresses {
            match self.check_account(user, current_block).await {
                Ok(Some(opportunity)) => {
                    opportunities += 1;
                    log_opportunity(&opportunity);
                    self.handle_opportunity(&opportunity).await;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(user = %user, error = %e, "Failed to read account data, skipping this round");
                }
            }
        }

        opportunities
    }

    /// Refresh one account and detect insolvency.
    ///
    /// Debt-free accounts are skipped without touching stored metrics;
    /// everything else always refreshes the position, liquidatable or not.
    pub async fn check_account(
        &self,
        user: Address,
        current_block: u64,
    ) -> Result<Option<LiquidationOpportunity>, ChainError> {
        let account = self.pool.get_user_account_data(user).await?;

        // Nothing to liquidate and nothing worth recording
        if account.total_debt_base.is_zero() {
            return Ok(None);
        }

        let health_factor = ray_to_decimal(account.health_factor);
        let now = Utc::now();

        self.registry.update(&user, |position| {
            position.health_factor = health_factor;
            position.last_checked_block = current_block;
            position.last_checked_at = now;
            position.total_collateral_base = account.total_collateral_base;
            position.total_debt_base = account.total_debt_base;
        });

        if health_factor < self.config.health_factor_threshold {
            return Ok(Some(LiquidationOpportunity {
                user,
                health_factor,
                total_collateral_base: account.total_collateral_base,
                total_debt_base: account.total_debt_base,
                available_borrows_base: account.available_borrows_base,
                current_liquidation_threshold: account.current_liquidation_threshold,
                block_number: current_block,
                detected_at: now,
            }));
        }

        debug!(
            user = %user,
            health_factor = %health_factor,
            collateral = %account.total_collateral_base,
            debt = %account.total_debt_base,
            "Position healthy"
        );

        Ok(None)
    }

    /// Evaluate profitability and, when enabled and worthwhile, execute.
    async fn handle_opportunity(&self, opportunity: &LiquidationOpportunity) {
        let gas_price = match self.client.gas_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!(user = %opportunity.user, error = %e, "Failed to fetch gas price");
                return;
            }
        };

        let reserve_configuration = match self
            .pool
            .get_reserve_configuration(self.config.default_collateral_asset)
            .await
        {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "Could not fetch reserve configuration, using default liquidation bonus");
                None
            }
        };

        let calc =
            profitability::evaluate(opportunity, &self.config, gas_price, reserve_configuration);
        log_profitability(opportunity.user, &calc);

        if !self.config.enable_auto_liquidation {
            info!(user = %opportunity.user, "Auto-liquidation disabled, skipping execution");
            return;
        }
        if !calc.is_profitable {
            info!(user = %opportunity.user, "Liquidation not profitable, skipping execution");
            return;
        }

        match self.executor.execute(opportunity, calc.debt_to_cover).await {
            Ok(outcome) => {
                info!(
                    user = %opportunity.user,
                    strategy = ?outcome.strategy,
                    tx_hash = %outcome.tx_hash,
                    block = outcome.block_number,
                    gas_used = outcome.gas_used,
                    "Liquidation executed"
                );
            }
            Err(e) => {
                warn!(user = %opportunity.user, error = %e, "Liquidation failed");
            }
        }
    }
}

fn log_opportunity(opportunity: &LiquidationOpportunity) {
    info!(
        user = %opportunity.user,
        health_factor = %opportunity.health_factor,
        collateral = %opportunity.total_collateral_base,
        debt = %opportunity.total_debt_base,
        available_borrows = %opportunity.available_borrows_base,
        liquidation_threshold = %opportunity.current_liquidation_threshold,
        block = opportunity.block_number,
        "Liquidation opportunity detected"
    );
}

fn log_profitability(user: Address, calc: &ProfitCalculation) {
    info!(
        user = %user,
        debt_to_cover = %calc.debt_to_cover,
        bonus_bps = calc.liquidation_bonus_bps,
        expected_collateral = %calc.expected_collateral,
        gas_cost = %calc.estimated_gas_cost,
        net_profit = %calc.net_profit,
        profit_fraction = %calc.profit_fraction,
        profitable = calc.is_profitable,
        "Profitability analysis"
    );
}
