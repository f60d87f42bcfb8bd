//! Transaction signer and sender.
//! Uses Alloy providers for type-safe RPC interactions.
//!
//! Every transaction path in the bot (approval, liquidation, withdrawal) runs
//! through [`TransactionSender::submit`], which holds an async submission lock
//! while it fetches the pending nonce, signs, and sends. Concurrent loops
//! therefore cannot race two transactions onto the same nonce; serialization
//! is enforced by construction, not by retry.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ChainError;

/// Gas limit budgeted for liquidation-sized transactions.
const DEFAULT_GAS_LIMIT: u64 = 3_000_000;

/// Signing transaction sender with serialized submission.
pub struct TransactionSender {
    /// RPC URL for sending transactions
    rpc_url: String,
    /// Signer wallet
    wallet: EthereumWallet,
    /// Signer address
    pub address: Address,
    /// Chain ID
    chain_id: u64,
    /// Gas limit applied to every submission
    gas_limit: u64,
    /// Serializes nonce fetch + sign + send across all loops
    submission_lock: Mutex<()>,
}

impl TransactionSender {
    /// Create a sender from a hex private key (with or without 0x prefix).
    pub async fn new(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        let key_str = private_key.trim_start_matches("0x");
        let signer: PrivateKeySigner = key_str.parse()?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        info!(
            address = %address,
            chain_id,
            "Transaction sender initialized"
        );

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            wallet,
            address,
            chain_id,
            gas_limit: DEFAULT_GAS_LIMIT,
            submission_lock: Mutex::new(()),
        })
    }

    /// Override the per-transaction gas limit.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Sign and submit a call to `to` and return the transaction hash.
    ///
    /// The pending nonce is fetched fresh under the submission lock
    /// immediately before signing, so a transaction submitted by another
    /// loop moments earlier is always observed.
    pub async fn submit(&self, to: Address, calldata: Bytes) -> Result<B256, ChainError> {
        let _guard = self.submission_lock.lock().await;

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.parse().map_err(ChainError::rpc)?);

        let nonce = provider
            .get_transaction_count(self.address)
            .pending()
            .await
            .map_err(ChainError::rpc)?;

        let gas_price = provider.get_gas_price().await.map_err(ChainError::rpc)?;

        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(calldata)
            .with_value(U256::ZERO)
            .with_nonce(nonce)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(gas_price)
            .with_chain_id(self.chain_id);

        debug!(
            to = %to,
            nonce,
            gas_price,
            gas_limit = self.gas_limit,
            "Submitting transaction"
        );

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(ChainError::submission)?;
        let tx_hash = *pending.tx_hash();

        info!(to = %to, nonce, tx_hash = %tx_hash, "Transaction submitted");

        Ok(tx_hash)
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}
