// types/src/chain.rs
//! Block, transaction and receipt records as handed over by the chain
//! collaborator. Addresses and hashes are `0x`-prefixed hex strings;
//! `input` is the raw calldata as `0x`-prefixed lowercase hex.

use serde::{Deserialize, Serialize};

/// Height of the last block before the protocol family existed on chain.
/// The first block an indexer applies is the one right after it.
pub const PROTOCOL_GENESIS_HEIGHT: u64 = 10_320_518;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainBlock {
    pub number: u64,
    pub timestamp: u64,
    pub txs: Vec<ChainTransaction>,
    pub receipts: Vec<ChainReceipt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTransaction {
    /// Transaction hash.
    pub id: String,
    pub from: String,
    /// Empty for contract-creation transactions.
    pub to: String,
    pub block: u64,
    pub idx: u32,
    pub timestamp: u64,
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainReceipt {
    pub tx_hash: String,
    pub timestamp: u64,
    pub logs: Vec<LogRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Address of the emitting contract.
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}
