//! AAVE V3 pool interface.
//!
//! Subset of the pool ABI needed for monitoring and liquidation: the four
//! position-changing events used for account discovery, the account data and
//! reserve configuration reads, and the liquidation call itself.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::client::RawLog;
use crate::contracts::LendingPool;
use crate::error::ChainError;
use crate::signer::TransactionSender;

sol! {
    /// Aave V3 Pool interface (subset for monitoring and liquidation)
    #[sol(rpc)]
    interface IPool {
        event Supply(address indexed reserve, address user, address indexed onBehalfOf, uint256 amount, uint16 indexed referralCode);
        event Withdraw(address indexed reserve, address indexed user, address indexed to, uint256 amount);
        event Borrow(address indexed reserve, address user, address indexed onBehalfOf, uint256 amount, uint8 interestRateMode, uint256 borrowRate, uint16 indexed referralCode);
        event Repay(address indexed reserve, address indexed user, address indexed repayer, uint256 amount, bool useATokens);

        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralBase,
            uint256 totalDebtBase,
            uint256 availableBorrowsBase,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );

        /// Packed reserve configuration bitmap for an asset
        function getConfiguration(address asset) external view returns (uint256 data);

        /// Liquidate a position - direct pool call
        function liquidationCall(
            address collateralAsset,
            address debtAsset,
            address user,
            uint256 debtToCover,
            bool receiveAToken
        ) external;
    }
}

/// Event signature constants for AAVE V3.
pub mod aave_v3_signatures {
    use alloy::primitives::B256;

    /// keccak256("Supply(address,address,address,uint256,uint16)")
    pub const SUPPLY: B256 = B256::new([
        0x2b, 0x62, 0x7c, 0xe5, 0x32, 0x47, 0xe1, 0x4b, 0x2c, 0x94, 0x3c, 0xb3, 0x84, 0xf6, 0x22,
        0xb9, 0x70, 0x64, 0x99, 0x4c, 0x68, 0x32, 0x18, 0x0f, 0x2a, 0x71, 0x7c, 0x7f, 0xa2, 0xac,
        0xe2, 0x9e,
    ]);

    /// keccak256("Withdraw(address,address,address,uint256)")
    pub const WITHDRAW: B256 = B256::new([
        0x31, 0x15, 0xd1, 0x44, 0x9a, 0x7b, 0x73, 0x2c, 0x4a, 0x14, 0x53, 0x4b, 0x82, 0x26, 0x19,
        0xf7, 0x2c, 0xc4, 0xd7, 0x0e, 0xf5, 0x2d, 0x8e, 0x0e, 0x2a, 0x7d, 0x6d, 0x80, 0x6b, 0x48,
        0xd8, 0x39,
    ]);

    /// keccak256("Borrow(address,address,address,uint256,uint8,uint256,uint16)")
    pub const BORROW: B256 = B256::new([
        0xb3, 0xd0, 0x84, 0x82, 0x0f, 0xb1, 0xa9, 0xde, 0xcf, 0xef, 0xf7, 0xce, 0x23, 0xfb, 0x0d,
        0xb6, 0x95, 0x43, 0xa8, 0xae, 0x27, 0x5f, 0xde, 0x06, 0x3a, 0xba, 0xf5, 0x81, 0x2f, 0x3c,
        0xc5, 0x88,
    ]);

    /// keccak256("Repay(address,address,address,uint256,bool)")
    pub const REPAY: B256 = B256::new([
        0xa5, 0x34, 0xc8, 0xdc, 0xe0, 0x52, 0x79, 0xf5, 0xb3, 0x05, 0xbd, 0xfd, 0xa9, 0x35, 0x48,
        0x8f, 0xf4, 0xf1, 0xc8, 0x3d, 0xd2, 0x62, 0x1e, 0x7e, 0xb0, 0x56, 0xd7, 0xa5, 0x93, 0x98,
        0x74, 0x80,
    ]);

    /// All position-changing pool event signatures, for discovery filters.
    pub fn pool_signatures() -> Vec<B256> {
        vec![SUPPLY, WITHDRAW, BORROW, REPAY]
    }
}

/// Aggregate account data returned by `getUserAccountData`.
#[derive(Debug, Clone)]
pub struct UserAccountData {
    /// Total collateral in the pool's base currency
    pub total_collateral_base: U256,
    /// Total debt in the pool's base currency
    pub total_debt_base: U256,
    /// Remaining borrowing power in base currency
    pub available_borrows_base: U256,
    /// Weighted average liquidation threshold (basis points)
    pub current_liquidation_threshold: U256,
    /// Weighted average loan-to-value (basis points)
    pub ltv: U256,
    /// Health factor in ray (1e27 = solvency boundary)
    pub health_factor: U256,
}

/// Extract the account an event concerns, per event shape.
///
/// Supply and Borrow carry the user as the first 32-byte word of the data
/// section; Withdraw and Repay index the user as topic 1. Logs with other
/// signatures or malformed payloads yield `None`.
pub fn user_from_log(log: &RawLog) -> Option<Address> {
    let sig = log.topics.first()?;

    let user = if *sig == aave_v3_signatures::SUPPLY || *sig == aave_v3_signatures::BORROW {
        if log.data.len() < 32 {
            return None;
        }
        Address::from_slice(&log.data[12..32])
    } else if *sig == aave_v3_signatures::WITHDRAW || *sig == aave_v3_signatures::REPAY {
        if log.topics.len() < 2 {
            return None;
        }
        Address::from_slice(&log.topics[1][12..])
    } else {
        return None;
    };

    (user != Address::ZERO).then_some(user)
}

/// Alloy-backed [`LendingPool`] implementation.
pub struct AaveV3Pool {
    address: Address,
    rpc_url: String,
    sender: Arc<TransactionSender>,
}

impl AaveV3Pool {
    /// Create a pool wrapper.
    pub fn new(address: Address, rpc_url: impl Into<String>, sender: Arc<TransactionSender>) -> Self {
        Self {
            address,
            rpc_url: rpc_url.into(),
            sender,
        }
    }
}

#[async_trait]
impl LendingPool for AaveV3Pool {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_user_account_data(&self, user: Address) -> Result<UserAccountData, ChainError> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);
        let pool = IPool::new(self.address, &provider);

        let data = pool
            .getUserAccountData(user)
            .call()
            .await
            .map_err(ChainError::rpc)?;

        Ok(UserAccountData {
            total_collateral_base: data.totalCollateralBase,
            total_debt_base: data.totalDebtBase,
            available_borrows_base: data.availableBorrowsBase,
            current_liquidation_threshold: data.currentLiquidationThreshold,
            ltv: data.ltv,
            health_factor: data.healthFactor,
        })
    }

    async fn get_reserve_configuration(&self, asset: Address) -> Result<U256, ChainError> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);
        let pool = IPool::new(self.address, &provider);

        let config = pool
            .getConfiguration(asset)
            .call()
            .await
            .map_err(ChainError::rpc)?;

        Ok(config.data)
    }

    async fn liquidation_call(
        &self,
        collateral_asset: Address,
        debt_asset: Address,
        user: Address,
        debt_to_cover: U256,
        receive_atoken: bool,
    ) -> Result<B256, ChainError> {
        let call = IPool::liquidationCallCall {
            collateralAsset: collateral_asset,
            debtAsset: debt_asset,
            user,
            debtToCover: debt_to_cover,
            receiveAToken: receive_atoken,
        };

        info!(
            pool = %self.address,
            user = %user,
            collateral = %collateral_asset,
            debt = %debt_asset,
            debt_to_cover = %debt_to_cover,
            "Sending liquidationCall"
        );

        self.sender
            .submit(self.address, Bytes::from(call.abi_encode()))
            .await
    }
}
