//! Flash-loan liquidation vehicle interface.
//!
//! The vehicle contract borrows the debt asset, performs the liquidation,
//! repays the loan, and keeps the seized collateral. Profit accumulates in
//! the contract (often as aTokens) until the owner withdraws it.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::contracts::FlashLoanVehicle;
use crate::error::ChainError;
use crate::signer::TransactionSender;

sol! {
    /// Flash-loan liquidation contract interface (subset)
    #[sol(rpc)]
    interface IFlashLoanLiquidation {
        function requestLiquidationLoanSimple(
            address _token,
            uint256 _amount,
            address _victim,
            address _collateralAsset
        ) external;

        function getBalance(address _tokenAddress) external view returns (uint256);

        function withdrawAToken(address _aTokenAddress) external;

        function withdraw(address _tokenAddress) external;

        function owner() external view returns (address);
    }
}

/// Alloy-backed [`FlashLoanVehicle`] implementation.
pub struct FlashLoanContract {
    address: Address,
    rpc_url: String,
    sender: Arc<TransactionSender>,
}

impl FlashLoanContract {
    /// Create a vehicle wrapper.
    pub fn new(address: Address, rpc_url: impl Into<String>, sender: Arc<TransactionSender>) -> Self {
        Self {
            address,
            rpc_url: rpc_url.into(),
            sender,
        }
    }
}

#[async_trait]
impl FlashLoanVehicle for FlashLoanContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn request_liquidation(
        &self,
        debt_asset: Address,
        amount: U256,
        borrower: Address,
        collateral_asset: Address,
    ) -> Result<B256, ChainError> {
        let call = IFlashLoanLiquidation::requestLiquidationLoanSimpleCall {
            _token: debt_asset,
            _amount: amount,
            _victim: borrower,
            _collateralAsset: collateral_asset,
        };

        info!(
            contract = %self.address,
            borrower = %borrower,
            debt_asset = %debt_asset,
            amount = %amount,
            "Sending flash loan liquidation"
        );

        self.sender
            .submit(self.address, Bytes::from(call.abi_encode()))
            .await
    }

    async fn balance_of(&self, token: Address) -> Result<U256, ChainError> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);
        let vehicle = IFlashLoanLiquidation::new(self.address, &provider);

        let balance = vehicle
            .getBalance(token)
            .call()
            .await
            .map_err(ChainError::rpc)?;
        Ok(balance._0)
    }

    async fn withdraw_underlying(&self, token: Address) -> Result<B256, ChainError> {
        let call = IFlashLoanLiquidation::withdrawCall {
            _tokenAddress: token,
        };

        info!(contract = %self.address, token = %token, "Sending withdrawal");

        self.sender
            .submit(self.address, Bytes::from(call.abi_encode()))
            .await
    }

    async fn withdraw_interest_bearing(&self, token: Address) -> Result<B256, ChainError> {
        let call = IFlashLoanLiquidation::withdrawATokenCall {
            _aTokenAddress: token,
        };

        info!(contract = %self.address, token = %token, "Sending aToken withdrawal");

        self.sender
            .submit(self.address, Bytes::from(call.abi_encode()))
            .await
    }

    async fn owner(&self) -> Result<Address, ChainError> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);
        let vehicle = IFlashLoanLiquidation::new(self.address, &provider);

        let owner = vehicle.owner().call().await.map_err(ChainError::rpc)?;
        Ok(owner._0)
    }
}
