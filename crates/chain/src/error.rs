//! Chain-level error taxonomy.
//!
//! Every transaction attempt can fail in one of four distinct ways, and the
//! distinction matters to callers: a submission failure means nothing reached
//! the chain, a revert means the transaction was mined and rejected, and a
//! confirmation timeout means we stopped waiting without knowing the outcome.

use alloy::primitives::B256;
use thiserror::Error;

/// Errors raised by the chain interaction layer.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A read call (block number, logs, balance, receipt lookup) failed.
    #[error("rpc error: {0}")]
    Rpc(#[source] anyhow::Error),

    /// Transaction never made it to the chain.
    #[error("transaction submission failed: {0}")]
    Submission(#[source] anyhow::Error),

    /// Receipt did not appear within the bounded polling window.
    #[error("timed out waiting for receipt of {hash}")]
    ConfirmationTimeout { hash: B256 },

    /// Transaction was mined but reverted.
    #[error("transaction {hash} reverted on-chain")]
    Reverted { hash: B256 },
}

impl ChainError {
    /// Wrap an RPC transport/decode error.
    pub fn rpc(err: impl Into<anyhow::Error>) -> Self {
        Self::Rpc(err.into())
    }

    /// Wrap a submission error.
    pub fn submission(err: impl Into<anyhow::Error>) -> Self {
        Self::Submission(err.into())
    }

    /// True if this is a revert (mined-and-failed) outcome.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }

    /// True if this is a confirmation timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }
}
