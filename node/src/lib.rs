// node/src/lib.rs
//! The chain collaborator: a capability for reading the tip height and
//! fetching assembled blocks, and its JSON-RPC implementation.

pub mod rpc_types;
pub mod transport;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use types::ChainBlock;

pub use rpc_types::{RpcBlock, RpcReceipt, WireError};
pub use transport::{Transport, TransportError};

/// Errors from the chain collaborator.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("wire format error: {0}")]
    Wire(#[from] WireError),

    #[error("block {0} not found")]
    MissingBlock(u64),
}

/// What the indexer needs from a chain node. Tests substitute a
/// deterministic fake; production uses [`RpcChainClient`].
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Number of the chain's latest confirmed block.
    async fn latest_height(&self) -> Result<u64, NodeError>;

    /// Fetch a block with its transactions and their receipts.
    async fn fetch_block(&self, number: u64) -> Result<ChainBlock, NodeError>;
}

/// JSON-RPC implementation over an EVM node's `eth_*` namespace.
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    transport: Transport,
}

impl RpcChainClient {
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            transport: Transport::new(url),
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn latest_height(&self) -> Result<u64, NodeError> {
        let number: String = self.transport.call("eth_blockNumber", vec![]).await?;
        Ok(rpc_types::parse_quantity(&number)?)
    }

    async fn fetch_block(&self, number: u64) -> Result<ChainBlock, NodeError> {
        let tag = format!("0x{number:x}");
        let block: Option<RpcBlock> = self
            .transport
            .call("eth_getBlockByNumber", vec![json!(tag), json!(true)])
            .await?;
        let block = block.ok_or(NodeError::MissingBlock(number))?;

        let mut receipts = Vec::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            let receipt: Option<RpcReceipt> = self
                .transport
                .call("eth_getTransactionReceipt", vec![json!(tx.hash.clone())])
                .await?;
            if let Some(receipt) = receipt {
                receipts.push(receipt);
            } else {
                debug!(tx = %tx.hash, "transaction without a receipt");
            }
        }

        Ok(block.into_chain_block(receipts)?)
    }
}
