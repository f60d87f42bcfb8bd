//! Execution-level error taxonomy.

use alloy::primitives::{Address, U256};
use thiserror::Error;

pub use aave_liquidator_chain::ChainError;

/// Failures surfaced by the liquidation executor and profit sweeper.
///
/// Chain-level outcomes (submission failure, revert, confirmation timeout)
/// pass through unchanged; the two domain variants cover conditions detected
/// before anything is submitted.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Wallet does not hold enough of the debt asset; nothing was submitted.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: U256, need: U256 },

    /// The bot wallet is not the flash-loan vehicle's owner.
    #[error("not the vehicle owner: owner is {owner}, caller is {caller}")]
    NotOwner { owner: Address, caller: Address },
}

impl ExecutionError {
    /// True if the underlying cause is an on-chain revert.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Chain(e) if e.is_revert())
    }

    /// True if the underlying cause is a confirmation timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Chain(e) if e.is_timeout())
    }
}
