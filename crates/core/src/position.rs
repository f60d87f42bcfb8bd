//! Position data structures for tracking user lending positions.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tracked account with an open (or once-open) position on the pool.
///
/// Created on first discovery with default metrics; thereafter mutated only
/// by the health monitor. Positions are never removed, even after they
/// become healthy, so re-discovery is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPosition {
    /// Account address
    pub user: Address,
    /// Last observed health factor (Decimal::MAX until first poll)
    pub health_factor: Decimal,
    /// Block height of the last successful poll
    pub last_checked_block: u64,
    /// Wall-clock time of the last successful poll
    pub last_checked_at: DateTime<Utc>,
    /// Last observed total collateral (pool base currency)
    pub total_collateral_base: U256,
    /// Last observed total debt (pool base currency)
    pub total_debt_base: U256,
}

impl TrackedPosition {
    /// Create a freshly discovered position with no observed metrics yet.
    pub fn new(user: Address) -> Self {
        Self {
            user,
            health_factor: Decimal::MAX,
            last_checked_block: 0,
            last_checked_at: Utc::now(),
            total_collateral_base: U256::ZERO,
            total_debt_base: U256::ZERO,
        }
    }

    /// True once the monitor has observed this position at least once.
    pub fn has_been_polled(&self) -> bool {
        self.last_checked_block > 0
    }
}

/// An under-collateralized position observed at a specific block.
///
/// Ephemeral: produced by the health monitor, consumed by the profitability
/// model and (if accepted) the executor, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationOpportunity {
    /// Account eligible for liquidation
    pub user: Address,
    /// Health factor at detection (below 1.0)
    pub health_factor: Decimal,
    /// Total collateral at detection
    pub total_collateral_base: U256,
    /// Total debt at detection
    pub total_debt_base: U256,
    /// Remaining borrowing power at detection
    pub available_borrows_base: U256,
    /// Weighted liquidation threshold at detection
    pub current_liquidation_threshold: U256,
    /// Block the metrics were read at
    pub block_number: u64,
    /// Detection wall-clock time
    pub detected_at: DateTime<Utc>,
}
