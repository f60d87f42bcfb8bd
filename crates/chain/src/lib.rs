//! Liquidator chain interaction layer.
//!
//! This crate provides:
//! - A `ChainClient` trait over JSON-RPC reads, with an Alloy HTTP impl
//! - Contract wrappers for the Aave V3 pool, ERC-20 tokens, and the
//!   flash-loan liquidation vehicle, behind async traits
//! - Transaction signing and serialized submission (fresh pending nonce
//!   under a submission lock)
//! - Bounded receipt polling with typed timeout/revert outcomes

mod client;
mod contracts;
mod error;
mod receipts;
mod signer;

pub use client::{ChainClient, HttpChainClient, RawLog, ReceiptInfo};
pub use contracts::{
    aave_v3_signatures, user_from_log, AaveV3Pool, Erc20, Erc20Contract, FlashLoanContract,
    FlashLoanVehicle, LendingPool, UserAccountData,
};
pub use error::ChainError;
pub use receipts::{wait_for_confirmation, ConfirmationPolicy};
pub use signer::TransactionSender;
