//! Liquidation bot core logic.
//!
//! This crate provides the monitoring and execution engine:
//! - Concurrent position registry shared by discovery and monitoring
//! - Account discovery from historical and real-time pool event logs
//! - Health factor monitoring with exact ray-to-decimal conversion
//! - A pure, deterministic profitability model
//! - Direct and flash-loan liquidation execution strategies
//! - Periodic profit withdrawal from the flash-loan vehicle

pub mod config;
mod discovery;
mod error;
mod executor;
pub mod math;
mod monitor;
mod position;
pub mod profitability;
mod registry;
mod sweeper;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::MonitorConfig;
pub use discovery::AddressDiscovery;
pub use error::ExecutionError;
pub use executor::{ExecutionOutcome, ExecutionStrategy, LiquidationExecutor};
pub use monitor::HealthMonitor;
pub use position::{LiquidationOpportunity, TrackedPosition};
pub use profitability::{decode_liquidation_bonus, ProfitCalculation};
pub use registry::PositionRegistry;
pub use sweeper::ProfitSweeper;
