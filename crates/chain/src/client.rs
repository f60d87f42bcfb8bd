//! Chain client abstraction over JSON-RPC reads.
//! Uses Alloy providers for type-safe RPC interactions.
//!
//! The [`ChainClient`] trait is the seam between the monitoring logic and the
//! RPC node: discovery, health polling, and receipt polling all go through it,
//! so tests can substitute a scripted client without a network.

use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ChainError;

/// A single event log, reduced to the fields the bot consumes.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// Emitting contract address
    pub address: Address,
    /// Topics (topic 0 is the event signature)
    pub topics: Vec<B256>,
    /// Non-indexed data
    pub data: Bytes,
    /// Block the log was emitted in
    pub block_number: u64,
}

/// Transaction receipt, reduced to the fields the bot consumes.
#[derive(Debug, Clone)]
pub struct ReceiptInfo {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block the transaction was mined in
    pub block_number: u64,
    /// Gas consumed
    pub gas_used: u64,
    /// True if the transaction succeeded
    pub status: bool,
}

/// Read-side chain operations.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current chain head height.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Chain ID of the connected node.
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Query logs emitted by `address` in `[from_block, to_block]` whose
    /// topic 0 matches any of `signatures`.
    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        address: Address,
        signatures: Vec<B256>,
    ) -> Result<Vec<RawLog>, ChainError>;

    /// Pending-state nonce for an account.
    async fn pending_nonce(&self, account: Address) -> Result<u64, ChainError>;

    /// Node-suggested gas price in wei.
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Receipt lookup; `None` while the transaction is unmined.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptInfo>, ChainError>;
}

/// HTTP-backed [`ChainClient`] built on Alloy providers.
///
/// Providers are constructed per call; Alloy's HTTP transport pools the
/// underlying connections, which keeps this struct trivially cloneable and
/// free of shared mutable state.
#[derive(Clone)]
pub struct HttpChainClient {
    rpc_url: String,
}

impl HttpChainClient {
    /// Create a client and verify the node answers.
    pub async fn connect(rpc_url: &str) -> Result<Self> {
        let client = Self {
            rpc_url: rpc_url.to_string(),
        };

        let block = client.block_number().await?;
        info!(rpc_url, block, "Chain client connected");

        Ok(client)
    }

    /// The RPC URL this client targets.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn provider(&self) -> Result<impl Provider, ChainError> {
        Ok(ProviderBuilder::new().on_http(self.rpc_url.parse().map_err(ChainError::rpc)?))
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn block_number(&self) -> Result<u64, ChainError> {
        let provider = self.provider()?;
        provider.get_block_number().await.map_err(ChainError::rpc)
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let provider = self.provider()?;
        provider.get_chain_id().await.map_err(ChainError::rpc)
    }

    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        address: Address,
        signatures: Vec<B256>,
    ) -> Result<Vec<RawLog>, ChainError> {
        let provider = self.provider()?;

        let filter = Filter::new()
            .from_block(from_block)
            .to_block(to_block)
            .address(address)
            .event_signature(signatures);

        let logs = provider.get_logs(&filter).await.map_err(ChainError::rpc)?;

        debug!(
            from_block,
            to_block,
            count = logs.len(),
            "Fetched logs"
        );

        Ok(logs
            .into_iter()
            .map(|log| RawLog {
                address: log.address(),
                topics: log.topics().to_vec(),
                data: log.data().data.clone(),
                block_number: log.block_number.unwrap_or(0),
            })
            .collect())
    }

    async fn pending_nonce(&self, account: Address) -> Result<u64, ChainError> {
        let provider = self.provider()?;
        provider
            .get_transaction_count(account)
            .pending()
            .await
            .map_err(ChainError::rpc)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        let provider = self.provider()?;
        provider.get_gas_price().await.map_err(ChainError::rpc)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptInfo>, ChainError> {
        let provider = self.provider()?;
        let receipt = provider
            .get_transaction_receipt(hash)
            .await
            .map_err(ChainError::rpc)?;

        Ok(receipt.map(|r| ReceiptInfo {
            tx_hash: hash,
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used as u64,
            status: r.status(),
        }))
    }
}
