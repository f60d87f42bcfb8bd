//! Aave V3 liquidation bot.
//!
//! Discovers accounts with open positions from pool event logs, polls their
//! health factors, evaluates liquidation profitability net of gas, executes
//! liquidations directly or through a flash-loan vehicle, and periodically
//! sweeps realized profit back to the owner wallet.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aave_liquidator_chain::{
    AaveV3Pool, ChainClient, Erc20Contract, FlashLoanContract, FlashLoanVehicle, HttpChainClient,
    TransactionSender,
};
use aave_liquidator_core::{
    AddressDiscovery, HealthMonitor, LiquidationExecutor, MonitorConfig, PositionRegistry,
    ProfitSweeper,
};

/// Environment variable names owned by the binary.
mod env {
    pub const RPC_URL: &str = "RPC_URL";
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
}

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,aave_liquidator_core=debug,aave_liquidator_chain=debug")
        }))
        .init();

    // Resolve configuration (fatal on missing/inconsistent values)
    let config = Arc::new(MonitorConfig::from_env().context("invalid configuration")?);
    config.log_config();

    let rpc_url =
        std::env::var(env::RPC_URL).unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
    let private_key =
        std::env::var(env::PRIVATE_KEY).context("PRIVATE_KEY environment variable is not set")?;

    // Chain client
    let http_client = HttpChainClient::connect(&rpc_url)
        .await
        .context("failed to connect to RPC node")?;
    let chain_id = http_client.chain_id().await?;
    info!(chain_id, "Connected to chain");

    let client: Arc<dyn ChainClient> = Arc::new(http_client);

    // Signer (fatal on a bad key: nothing works without a signing identity)
    let sender = Arc::new(TransactionSender::new(&private_key, &rpc_url, chain_id).await?);
    info!(wallet = %sender.address, "Bot wallet ready");

    // Contract wrappers
    let pool = Arc::new(AaveV3Pool::new(
        config.pool_address,
        rpc_url.clone(),
        sender.clone(),
    ));
    let debt_token = Arc::new(Erc20Contract::new(
        config.default_debt_asset,
        rpc_url.clone(),
        sender.clone(),
    ));
    let flash_loan: Option<Arc<dyn FlashLoanVehicle>> =
        config.flash_loan_contract_address.map(|address| {
            Arc::new(FlashLoanContract::new(address, rpc_url.clone(), sender.clone()))
                as Arc<dyn FlashLoanVehicle>
        });

    // Core components
    let registry = Arc::new(PositionRegistry::new());
    let discovery = Arc::new(AddressDiscovery::new(
        client.clone(),
        registry.clone(),
        config.clone(),
    ));
    let executor = Arc::new(LiquidationExecutor::new(
        client.clone(),
        pool.clone(),
        debt_token,
        flash_loan.clone(),
        sender.address,
        config.clone(),
    ));
    let monitor = Arc::new(HealthMonitor::new(
        client.clone(),
        pool,
        registry.clone(),
        executor,
        config.clone(),
    ));

    // Graceful shutdown: all loops observe one token
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                cancel.cancel();
            }
        });
    }

    // Phase 1: seed the registry from historical events (fails soft)
    info!("Phase 1: discovering addresses from historical events");
    discovery.historical_scan().await;

    let mut handles = Vec::new();

    // Phase 2: health factor monitoring
    info!("Phase 2: starting health factor monitoring");
    handles.push(tokio::spawn({
        let monitor = monitor.clone();
        let cancel = cancel.clone();
        async move { monitor.run(cancel).await }
    }));

    // Phase 3: real-time discovery
    info!("Phase 3: starting real-time event discovery");
    handles.push(tokio::spawn({
        let discovery = discovery.clone();
        let cancel = cancel.clone();
        async move { discovery.run(cancel).await }
    }));

    // Phase 4: profit withdrawal, only with a flash-loan vehicle to sweep
    if config.enable_auto_withdraw && config.use_flash_loan_liquidation {
        match flash_loan {
            Some(vehicle) => {
                info!("Phase 4: starting automatic profit withdrawal");
                let sweeper = Arc::new(ProfitSweeper::new(
                    client.clone(),
                    vehicle,
                    sender.address,
                    config.clone(),
                ));
                handles.push(tokio::spawn({
                    let cancel = cancel.clone();
                    async move { sweeper.run(cancel).await }
                }));
            }
            None => {
                // unreachable when config came from from_env, which requires
                // a vehicle address whenever the flash-loan flag is set
                warn!("Auto-withdraw enabled but no flash loan vehicle configured");
            }
        }
    }

    info!("Bot is live and monitoring");

    for handle in handles {
        let _ = handle.await;
    }

    info!("Bot stopped");
    Ok(())
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    ┌─┐┌─┐┬  ┬┌─┐  ┬  ┬┌─┐ ┬ ┬┬┌┬┐┌─┐┌┬┐┌─┐┬─┐
    ├─┤├─┤└┐┌┘├┤   │  ││─┼┐│ ││ ││├─┤ │ │ │├┬┘
    ┴ ┴┴ ┴ └┘ └─┘  ┴─┘┴└─┘└└─┘┴─┴┘┴ ┴ ┴ └─┘┴└─
    Aave V3 Liquidation Bot v0.1.0
    "#
    );
}
