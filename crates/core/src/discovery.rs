//! Account discovery from pool event logs.
//!
//! Two paths populate the registry: a one-shot historical scan at startup and
//! a continuous incremental poll. Both extract accounts from the same four
//! position-changing events and insert them idempotently; health metrics are
//! filled in later by the monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use aave_liquidator_chain::{aave_v3_signatures, user_from_log, ChainClient, ChainError};

use crate::config::MonitorConfig;
use crate::registry::PositionRegistry;

/// Cadence of the incremental log poll.
const REALTIME_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Discovers accounts with pool activity and tracks them in the registry.
pub struct AddressDiscovery {
    client: Arc<dyn ChainClient>,
    registry: Arc<PositionRegistry>,
    config: Arc<MonitorConfig>,
}

impl AddressDiscovery {
    /// Create a discovery worker.
    pub fn new(
        client: Arc<dyn ChainClient>,
        registry: Arc<PositionRegistry>,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// One-shot scan over the configured lookback window.
    ///
    /// Fails soft: any query error is logged and discovery proceeds with
    /// zero addresses, leaving population to the real-time path. Returns the
    /// number of newly tracked addresses.
    pub async fn historical_scan(&self) -> usize {
        let head = match self.client.block_number().await {
            Ok(block) => block,
            Err(e) => {
                warn!(error = %e, "Historical scan: failed to get current block");
                return 0;
            }
        };

        let from_block = head.saturating_sub(self.config.historical_blocks_lookback);

        info!(
            from_block,
            to_block = head,
            pool = %self.config.pool_address,
            "Scanning historical pool events"
        );

        let logs = match self
            .client
            .get_logs(
                from_block,
                head,
                self.config.pool_address,
                aave_v3_signatures::pool_signatures(),
            )
            .await
        {
            Ok(logs) => logs,
            Err(e) => {
                warn!(error = %e, "Historical scan: log query failed");
                return 0;
            }
        };

        info!(count = logs.len(), "Historical scan found event logs");

        let inserted = self.track_users(&logs);

        info!(
            new_addresses = inserted,
            tracked_total = self.registry.len(),
            "Historical discovery complete"
        );

        if inserted == 0 {
            info!(
                lookback = self.config.historical_blocks_lookback,
                "No addresses found in lookback window; real-time discovery will populate the registry"
            );
        }

        inserted
    }

    /// Continuous incremental discovery until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = REALTIME_SCAN_INTERVAL.as_secs(),
            "Starting real-time event discovery"
        );

        let mut last_scanned = match self.client.block_number().await {
            Ok(block) => block,
            Err(e) => {
                warn!(error = %e, "Real-time discovery: failed to get starting block, starting at 0");
                0
            }
        };

        let mut ticker = interval(REALTIME_SCAN_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Real-time discovery stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.scan_new_blocks(&mut last_scanned).await {
                        warn!(error = %e, "Real-time discovery tick failed");
                    }
                }
            }
        }
    }

    /// Scan the block range since the watermark and advance it to the head.
    ///
    /// The watermark moves to the current head whether or not any logs
    /// matched, so every block is queried exactly once: no re-scan of empty
    /// ranges, no gaps. Returns the number of newly tracked addresses.
    pub async fn scan_new_blocks(&self, last_scanned: &mut u64) -> Result<usize, ChainError> {
        let head = self.client.block_number().await?;

        if head <= *last_scanned {
            return Ok(0);
        }

        let logs = self
            .client
            .get_logs(
                *last_scanned + 1,
                head,
                self.config.pool_address,
                aave_v3_signatures::pool_signatures(),
            )
            .await?;

        if !logs.is_empty() {
            debug!(
                from_block = *last_scanned + 1,
                to_block = head,
                count = logs.len(),
                "Discovered new pool events"
            );
        }

        let inserted = self.track_users(&logs);
        if inserted > 0 {
            info!(
                new_addresses = inserted,
                tracked_total = self.registry.len(),
                "New addresses discovered"
            );
        }

        *last_scanned = head;
        Ok(inserted)
    }

    fn track_users(&self, logs: &[aave_liquidator_chain::RawLog]) -> usize {
        let mut inserted = 0;
        for log in logs {
            if let Some(user) = user_from_log(log) {
                if self.registry.insert_if_absent(user) {
                    debug!(user = %user, "Tracking new address");
                    inserted += 1;
                }
            }
        }
        inserted
    }
}
