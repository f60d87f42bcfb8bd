//! Liquidation execution strategies.
//!
//! Two mutually exclusive strategies, selected by configuration:
//!
//! - **Direct**: the bot wallet repays the debt from its own balance via
//!   `liquidationCall`, approving the pool first when the allowance is short.
//! - **Flash-loan**: a single transaction to the vehicle contract, which
//!   borrows, liquidates, and repays atomically.
//!
//! Both end in the same bounded confirmation poll; a revert, a timeout, and
//! a submission failure surface as distinct errors.

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::info;

use aave_liquidator_chain::{
    wait_for_confirmation, ChainClient, Erc20, FlashLoanVehicle, LendingPool,
};

use crate::config::MonitorConfig;
use crate::error::ExecutionError;
use crate::position::LiquidationOpportunity;

/// Which execution path produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Direct,
    FlashLoan,
}

/// A confirmed liquidation.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Strategy that executed
    pub strategy: ExecutionStrategy,
    /// Liquidation transaction hash
    pub tx_hash: alloy::primitives::B256,
    /// Block the liquidation was mined in
    pub block_number: u64,
    /// Gas consumed by the liquidation transaction
    pub gas_used: u64,
}

/// Executes liquidations against the pool or the flash-loan vehicle.
pub struct LiquidationExecutor {
    client: Arc<dyn ChainClient>,
    pool: Arc<dyn LendingPool>,
    debt_token: Arc<dyn Erc20>,
    flash_loan: Option<Arc<dyn FlashLoanVehicle>>,
    wallet_address: Address,
    config: Arc<MonitorConfig>,
}

impl LiquidationExecutor {
    /// Create an executor.
    pub fn new(
        client: Arc<dyn ChainClient>,
        pool: Arc<dyn LendingPool>,
        debt_token: Arc<dyn Erc20>,
        flash_loan: Option<Arc<dyn FlashLoanVehicle>>,
        wallet_address: Address,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            client,
            pool,
            debt_token,
            flash_loan,
            wallet_address,
            config,
        }
    }

    /// Execute a liquidation for `opportunity`, covering `debt_to_cover`.
    pub async fn execute(
        &self,
        opportunity: &LiquidationOpportunity,
        debt_to_cover: U256,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        if self.config.use_flash_loan_liquidation {
            if let Some(vehicle) = self.flash_loan.clone() {
                return self
                    .execute_flash_loan(&*vehicle, opportunity, debt_to_cover)
                    .await;
            }
        }
        self.execute_direct(opportunity, debt_to_cover).await
    }

    /// Direct liquidation funded from the bot wallet.
    async fn execute_direct(
        &self,
        opportunity: &LiquidationOpportunity,
        debt_to_cover: U256,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        info!(
            user = %opportunity.user,
            debt_to_cover = %debt_to_cover,
            debt_asset = %self.config.default_debt_asset,
            collateral_asset = %self.config.default_collateral_asset,
            "Preparing direct liquidation"
        );

        let balance = self.debt_token.balance_of(self.wallet_address).await?;
        if balance < debt_to_cover {
            return Err(ExecutionError::InsufficientBalance {
                have: balance,
                need: debt_to_cover,
            });
        }

        let allowance = self
            .debt_token
            .allowance(self.wallet_address, self.pool.address())
            .await?;

        if allowance < debt_to_cover {
            // Approve unlimited spend so future liquidations skip this step
            let approve_hash = self
                .debt_token
                .approve(self.pool.address(), U256::MAX)
                .await?;

            info!(tx_hash = %approve_hash, "Waiting for approval confirmation");
            let receipt =
                wait_for_confirmation(&*self.client, approve_hash, &self.config.confirmation)
                    .await?;
            info!(block = receipt.block_number, "Approval confirmed");
        }

        let tx_hash = self
            .pool
            .liquidation_call(
                self.config.default_collateral_asset,
                self.config.default_debt_asset,
                opportunity.user,
                debt_to_cover,
                false, // receive underlying asset, not aToken
            )
            .await?;

        info!(tx_hash = %tx_hash, "Waiting for liquidation confirmation");
        let receipt =
            wait_for_confirmation(&*self.client, tx_hash, &self.config.confirmation).await?;

        info!(
            user = %opportunity.user,
            tx_hash = %tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Direct liquidation confirmed"
        );

        Ok(ExecutionOutcome {
            strategy: ExecutionStrategy::Direct,
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    /// Flash-loan-financed liquidation through the vehicle contract.
    async fn execute_flash_loan(
        &self,
        vehicle: &dyn FlashLoanVehicle,
        opportunity: &LiquidationOpportunity,
        debt_to_cover: U256,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        info!(
            user = %opportunity.user,
            debt_to_cover = %debt_to_cover,
            contract = %vehicle.address(),
            "Preparing flash loan liquidation"
        );

        let tx_hash = vehicle
            .request_liquidation(
                self.config.default_debt_asset,
                debt_to_cover,
                opportunity.user,
                self.config.default_collateral_asset,
            )
            .await?;

        info!(tx_hash = %tx_hash, "Waiting for flash loan confirmation");
        let receipt =
            wait_for_confirmation(&*self.client, tx_hash, &self.config.confirmation).await?;

        info!(
            user = %opportunity.user,
            tx_hash = %tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Flash loan liquidation confirmed"
        );

        Ok(ExecutionOutcome {
            strategy: ExecutionStrategy::FlashLoan,
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}
