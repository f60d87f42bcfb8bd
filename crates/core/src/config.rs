//! Monitor configuration, resolved once at startup.
//!
//! Configuration is read from environment variables (plus `.env` via
//! `dotenvy` in the binary), validated, and frozen into an immutable
//! snapshot that every loop receives at construction. No loop mutates
//! configuration after startup.

use alloy::primitives::{Address, U256};
use anyhow::{anyhow, bail, Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use aave_liquidator_chain::ConfirmationPolicy;

/// Environment variable names.
pub mod env {
    pub const POOL_ADDRESS: &str = "POOL_ADDRESS";
    pub const POLL_INTERVAL: &str = "POLL_INTERVAL";
    pub const HISTORICAL_BLOCKS_LOOKBACK: &str = "HISTORICAL_BLOCKS_LOOKBACK";
    pub const ENABLE_AUTO_LIQUIDATION: &str = "ENABLE_AUTO_LIQUIDATION";
    pub const LIQUIDATION_PROFIT_THRESHOLD: &str = "LIQUIDATION_PROFIT_THRESHOLD";
    pub const MAX_LIQUIDATION_AMOUNT: &str = "MAX_LIQUIDATION_AMOUNT";
    pub const DEFAULT_DEBT_ASSET: &str = "DEFAULT_DEBT_ASSET";
    pub const DEFAULT_COLLATERAL_ASSET: &str = "DEFAULT_COLLATERAL_ASSET";
    pub const USE_FLASHLOAN_LIQUIDATION: &str = "USE_FLASHLOAN_LIQUIDATION";
    pub const FLASHLOAN_CONTRACT_ADDRESS: &str = "FLASHLOAN_CONTRACT_ADDRESS";
    pub const ENABLE_AUTO_WITHDRAW: &str = "ENABLE_AUTO_WITHDRAW";
    pub const WITHDRAW_INTERVAL: &str = "WITHDRAW_INTERVAL";
    pub const MIN_WITHDRAW_AMOUNT: &str = "MIN_WITHDRAW_AMOUNT";
    pub const WITHDRAW_TOKENS: &str = "WITHDRAW_TOKENS";
}

/// Mainnet WETH, the historical default for both asset slots.
const DEFAULT_ASSET: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

/// Process-wide monitoring configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Lending pool contract address
    pub pool_address: Address,
    /// Health monitor tick interval
    pub poll_interval: Duration,
    /// Historical discovery lookback window in blocks
    pub historical_blocks_lookback: u64,
    /// Solvency boundary; positions below it are liquidatable
    pub health_factor_threshold: Decimal,
    /// Whether detected profitable opportunities are executed
    pub enable_auto_liquidation: bool,
    /// Minimum net profit as a fraction of debt covered
    pub liquidation_profit_threshold: Decimal,
    /// Ceiling on debt covered per liquidation call
    pub max_liquidation_amount: U256,
    /// Debt asset repaid during liquidation
    pub default_debt_asset: Address,
    /// Collateral asset seized during liquidation
    pub default_collateral_asset: Address,
    /// Route liquidations through the flash-loan vehicle
    pub use_flash_loan_liquidation: bool,
    /// Flash-loan vehicle address (required when the flag is set)
    pub flash_loan_contract_address: Option<Address>,
    /// Periodically sweep vehicle profits to the owner
    pub enable_auto_withdraw: bool,
    /// Sweep interval
    pub withdraw_interval: Duration,
    /// Balances below this are left in the vehicle
    pub min_withdraw_amount: U256,
    /// Tokens to sweep; falls back to the collateral asset when empty
    pub withdraw_tokens: Vec<Address>,

    // Protocol policy parameters. These mirror Aave V3 conventions but are
    // not derived from the contract; verify against the target deployment.
    /// Portion of outstanding debt covered per call, in basis points
    pub close_factor_bps: u16,
    /// Bit offset of the liquidation bonus field in the reserve configuration
    pub liquidation_bonus_bit_offset: u8,
    /// Bonus applied when the decoded value is missing or implausible
    pub default_liquidation_bonus_bps: u16,
    /// Decoded bonuses above this are treated as implausible
    pub max_plausible_bonus_bps: u16,
    /// Fixed gas estimate for a liquidation call
    pub liquidation_gas_estimate: u64,

    /// Receipt polling cadence and cutoff
    pub confirmation: ConfirmationPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            pool_address: Address::ZERO,
            poll_interval: Duration::from_secs(5),
            historical_blocks_lookback: 1000,
            health_factor_threshold: Decimal::ONE,
            enable_auto_liquidation: false,
            liquidation_profit_threshold: Decimal::new(1, 2), // 1%
            max_liquidation_amount: U256::from(10u64).pow(U256::from(18u64)),
            default_debt_asset: DEFAULT_ASSET.parse().unwrap(),
            default_collateral_asset: DEFAULT_ASSET.parse().unwrap(),
            use_flash_loan_liquidation: false,
            flash_loan_contract_address: None,
            enable_auto_withdraw: false,
            withdraw_interval: Duration::from_secs(3600),
            min_withdraw_amount: U256::ZERO,
            withdraw_tokens: Vec::new(),
            close_factor_bps: 5000,
            liquidation_bonus_bit_offset: 32,
            default_liquidation_bonus_bps: 500,
            max_plausible_bonus_bps: 2000,
            liquidation_gas_estimate: 400_000,
            confirmation: ConfirmationPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Resolve configuration from the environment.
    ///
    /// Missing required values and inconsistent flag combinations are fatal;
    /// the process must not start any loop with a broken configuration.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.pool_address = required_address(env::POOL_ADDRESS)?;

        if let Some(secs) = optional::<u64>(env::POLL_INTERVAL)? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(lookback) = optional::<u64>(env::HISTORICAL_BLOCKS_LOOKBACK)? {
            config.historical_blocks_lookback = lookback;
        }

        config.enable_auto_liquidation = flag(env::ENABLE_AUTO_LIQUIDATION);

        if let Some(threshold) = optional::<Decimal>(env::LIQUIDATION_PROFIT_THRESHOLD)? {
            config.liquidation_profit_threshold = threshold;
        }
        if let Some(amount) = optional_u256(env::MAX_LIQUIDATION_AMOUNT)? {
            config.max_liquidation_amount = amount;
        }
        if let Some(asset) = optional::<Address>(env::DEFAULT_DEBT_ASSET)? {
            config.default_debt_asset = asset;
        }
        if let Some(asset) = optional::<Address>(env::DEFAULT_COLLATERAL_ASSET)? {
            config.default_collateral_asset = asset;
        }

        config.use_flash_loan_liquidation = flag(env::USE_FLASHLOAN_LIQUIDATION);
        config.flash_loan_contract_address = optional::<Address>(env::FLASHLOAN_CONTRACT_ADDRESS)?;

        if config.use_flash_loan_liquidation && config.flash_loan_contract_address.is_none() {
            bail!(
                "{}=true but {} not set",
                env::USE_FLASHLOAN_LIQUIDATION,
                env::FLASHLOAN_CONTRACT_ADDRESS
            );
        }

        config.enable_auto_withdraw = flag(env::ENABLE_AUTO_WITHDRAW);
        if let Some(secs) = optional::<u64>(env::WITHDRAW_INTERVAL)? {
            config.withdraw_interval = Duration::from_secs(secs);
        }
        if let Some(amount) = optional_u256(env::MIN_WITHDRAW_AMOUNT)? {
            config.min_withdraw_amount = amount;
        }
        if let Ok(tokens) = std::env::var(env::WITHDRAW_TOKENS) {
            config.withdraw_tokens = parse_token_list(&tokens)?;
        }

        Ok(config)
    }

    /// Log the resolved configuration at startup.
    pub fn log_config(&self) {
        info!(
            pool = %self.pool_address,
            poll_interval_secs = self.poll_interval.as_secs(),
            lookback_blocks = self.historical_blocks_lookback,
            auto_liquidation = self.enable_auto_liquidation,
            flash_loan = self.use_flash_loan_liquidation,
            "Monitor configuration"
        );
        if let Some(vehicle) = self.flash_loan_contract_address {
            info!(contract = %vehicle, "Flash loan vehicle configured");
        }
        if self.enable_auto_liquidation {
            info!(
                debt_asset = %self.default_debt_asset,
                collateral_asset = %self.default_collateral_asset,
                max_liquidation_amount = %self.max_liquidation_amount,
                profit_threshold = %self.liquidation_profit_threshold,
                "Liquidation parameters"
            );
        }
        if self.enable_auto_withdraw {
            info!(
                interval_secs = self.withdraw_interval.as_secs(),
                min_amount = %self.min_withdraw_amount,
                token_count = self.withdraw_tokens.len(),
                "Auto-withdraw enabled"
            );
        }
    }
}

fn required_address(name: &str) -> Result<Address> {
    let value = std::env::var(name).map_err(|_| anyhow!("{name} not set"))?;
    value
        .parse()
        .with_context(|| format!("invalid address in {name}"))
}

fn optional<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            let parsed = value
                .trim()
                .parse()
                .with_context(|| format!("invalid value in {name}"))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

fn optional_u256(name: &str) -> Result<Option<U256>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            let parsed = U256::from_str(value.trim())
                .with_context(|| format!("invalid amount in {name}"))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

fn flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "true").unwrap_or(false)
}

fn parse_token_list(raw: &str) -> Result<Vec<Address>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .with_context(|| format!("invalid token address: {s}"))
        })
        .collect()
}
