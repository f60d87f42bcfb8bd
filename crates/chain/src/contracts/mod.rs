//! Contract wrappers and collaborator traits.
//!
//! Each external contract the bot talks to is exposed twice: as an
//! `#[async_trait]` seam the core logic depends on, and as an Alloy-backed
//! wrapper implementing that seam. The traits keep the monitoring and
//! execution logic testable against scripted collaborators.

pub mod aave_v3;
pub mod erc20;
pub mod flash_loan;

pub use aave_v3::{aave_v3_signatures, user_from_log, AaveV3Pool, UserAccountData};
pub use erc20::Erc20Contract;
pub use flash_loan::FlashLoanContract;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::ChainError;

/// Read and write operations against the lending pool.
#[async_trait]
pub trait LendingPool: Send + Sync {
    /// Pool contract address.
    fn address(&self) -> Address;

    /// Fetch aggregate account data (collateral, debt, health factor).
    async fn get_user_account_data(&self, user: Address) -> Result<UserAccountData, ChainError>;

    /// Fetch the packed reserve configuration word for an asset.
    async fn get_reserve_configuration(&self, asset: Address) -> Result<U256, ChainError>;

    /// Submit a liquidation call; returns the transaction hash.
    async fn liquidation_call(
        &self,
        collateral_asset: Address,
        debt_asset: Address,
        user: Address,
        debt_to_cover: U256,
        receive_atoken: bool,
    ) -> Result<B256, ChainError>;
}

/// ERC-20 operations used by the direct liquidation path.
#[async_trait]
pub trait Erc20: Send + Sync {
    /// Token balance of an account.
    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError>;

    /// Remaining spender allowance.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError>;

    /// Submit an approval; returns the transaction hash.
    async fn approve(&self, spender: Address, amount: U256) -> Result<B256, ChainError>;
}

/// Flash-loan execution vehicle: atomically borrows, liquidates, and repays
/// inside a single transaction, and holds realized profit until withdrawn.
#[async_trait]
pub trait FlashLoanVehicle: Send + Sync {
    /// Vehicle contract address.
    fn address(&self) -> Address;

    /// Submit a flash-loan-financed liquidation; returns the transaction hash.
    async fn request_liquidation(
        &self,
        debt_asset: Address,
        amount: U256,
        borrower: Address,
        collateral_asset: Address,
    ) -> Result<B256, ChainError>;

    /// Vehicle's balance of a token.
    async fn balance_of(&self, token: Address) -> Result<U256, ChainError>;

    /// Submit a plain token withdrawal to the owner.
    async fn withdraw_underlying(&self, token: Address) -> Result<B256, ChainError>;

    /// Submit an aToken redemption withdrawal to the owner.
    async fn withdraw_interest_bearing(&self, token: Address) -> Result<B256, ChainError>;

    /// Contract owner (the only account allowed to withdraw).
    async fn owner(&self) -> Result<Address, ChainError>;
}
