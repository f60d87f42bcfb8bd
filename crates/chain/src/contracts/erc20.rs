//! ERC-20 token interface for the direct liquidation path.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::contracts::Erc20;
use crate::error::ChainError;
use crate::signer::TransactionSender;

sol! {
    /// ERC-20 interface (subset)
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Alloy-backed [`Erc20`] implementation for a single token.
pub struct Erc20Contract {
    /// Token contract address
    pub address: Address,
    rpc_url: String,
    sender: Arc<TransactionSender>,
}

impl Erc20Contract {
    /// Create a token wrapper.
    pub fn new(address: Address, rpc_url: impl Into<String>, sender: Arc<TransactionSender>) -> Self {
        Self {
            address,
            rpc_url: rpc_url.into(),
            sender,
        }
    }
}

#[async_trait]
impl Erc20 for Erc20Contract {
    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);
        let token = IERC20::new(self.address, &provider);

        let balance = token
            .balanceOf(owner)
            .call()
            .await
            .map_err(ChainError::rpc)?;
        Ok(balance._0)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError> {
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);
        let token = IERC20::new(self.address, &provider);

        let allowance = token
            .allowance(owner, spender)
            .call()
            .await
            .map_err(ChainError::rpc)?;
        Ok(allowance._0)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<B256, ChainError> {
        let call = IERC20::approveCall { spender, amount };

        info!(
            token = %self.address,
            spender = %spender,
            amount = %amount,
            "Sending approval"
        );

        self.sender
            .submit(self.address, Bytes::from(call.abi_encode()))
            .await
    }
}
