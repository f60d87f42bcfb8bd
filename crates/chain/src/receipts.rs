//! Bounded receipt polling shared by every transaction path.

use alloy::primitives::B256;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::client::{ChainClient, ReceiptInfo};
use crate::error::ChainError;

/// Polling cadence and cutoff for confirmation waits.
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    /// Interval between receipt lookups
    pub poll_interval: Duration,
    /// Total time to wait before giving up
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Poll for a transaction receipt until it appears or the policy timeout
/// elapses.
///
/// Outcomes are distinct: a mined-and-successful receipt is `Ok`, a
/// mined-and-reverted receipt is [`ChainError::Reverted`], and an expired
/// wait is [`ChainError::ConfirmationTimeout`]. Transient lookup errors do
/// not abort the wait; polling continues until the deadline.
pub async fn wait_for_confirmation(
    client: &dyn ChainClient,
    hash: B256,
    policy: &ConfirmationPolicy,
) -> Result<ReceiptInfo, ChainError> {
    let deadline = Instant::now() + policy.timeout;
    let mut ticker = interval(policy.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match client.transaction_receipt(hash).await {
            Ok(Some(receipt)) => {
                if receipt.status {
                    debug!(
                        tx_hash = %hash,
                        block = receipt.block_number,
                        gas_used = receipt.gas_used,
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }
                return Err(ChainError::Reverted { hash });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(tx_hash = %hash, error = %e, "Receipt lookup failed, retrying");
            }
        }

        if Instant::now() >= deadline {
            return Err(ChainError::ConfirmationTimeout { hash });
        }
    }
}
