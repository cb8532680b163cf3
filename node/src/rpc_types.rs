// node/src/rpc_types.rs
//! `eth_*` wire structs and their conversion into the chain records
//! the indexer consumes.

use serde::Deserialize;
use thiserror::Error;

use types::{ChainBlock, ChainReceipt, ChainTransaction, LogRecord};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid hex quantity {0:?}")]
    BadQuantity(String),
}

/// Decode a `0x`-prefixed hex quantity into a `u64`.
pub fn parse_quantity(value: &str) -> Result<u64, WireError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| WireError::BadQuantity(value.to_owned()))?;
    u64::from_str_radix(digits, 16).map_err(|_| WireError::BadQuantity(value.to_owned()))
}

/// `eth_getBlockByNumber` response with full transaction objects.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcBlock {
    pub number: String,
    pub timestamp: String,
    pub transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcTransaction {
    pub hash: String,
    pub from: String,
    /// Absent for contract-creation transactions.
    pub to: Option<String>,
    pub input: String,
}

/// `eth_getTransactionReceipt` response, reduced to the log fields the
/// indexer looks at.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: String,
    pub logs: Vec<RpcLog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

impl RpcBlock {
    /// Assemble the block and its receipts into a [`ChainBlock`],
    /// stamping every transaction and receipt with the block time.
    pub fn into_chain_block(self, receipts: Vec<RpcReceipt>) -> Result<ChainBlock, WireError> {
        let number = parse_quantity(&self.number)?;
        let timestamp = parse_quantity(&self.timestamp)?;

        let txs = self
            .transactions
            .into_iter()
            .enumerate()
            .map(|(idx, tx)| ChainTransaction {
                id: tx.hash,
                from: tx.from,
                to: tx.to.unwrap_or_default(),
                block: number,
                idx: idx as u32,
                timestamp,
                input: tx.input,
            })
            .collect();

        let receipts = receipts
            .into_iter()
            .map(|receipt| ChainReceipt {
                tx_hash: receipt.transaction_hash,
                timestamp,
                logs: receipt
                    .logs
                    .into_iter()
                    .map(|log| LogRecord {
                        address: log.address,
                        topics: log.topics,
                        data: log.data,
                    })
                    .collect(),
            })
            .collect();

        Ok(ChainBlock {
            number,
            timestamp,
            txs,
            receipts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_decode_from_hex() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x9d7e87").unwrap(), 10_321_543);
        assert!(parse_quantity("10").is_err());
        assert!(parse_quantity("0xzz").is_err());
        assert!(parse_quantity("").is_err());
    }

    #[test]
    fn block_json_decodes_and_converts() {
        let block: RpcBlock = serde_json::from_str(
            r#"{
                "number": "0x9d7e87",
                "timestamp": "0x65a0f000",
                "transactions": [
                    {
                        "hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                        "from": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                        "to": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                        "input": "0x646174613a2c686921",
                        "gas": "0x5208"
                    },
                    {
                        "hash": "0x2222222222222222222222222222222222222222222222222222222222222222",
                        "from": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                        "to": null,
                        "input": "0x60806040"
                    }
                ]
            }"#,
        )
        .unwrap();
        let receipts: Vec<RpcReceipt> = serde_json::from_str(
            r#"[{
                "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                "logs": [{
                    "address": "0xcccccccccccccccccccccccccccccccccccccccc",
                    "topics": ["0xdddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd"],
                    "data": "0x"
                }]
            }]"#,
        )
        .unwrap();

        let chain_block = block.into_chain_block(receipts).unwrap();
        assert_eq!(chain_block.number, 10_321_543);
        assert_eq!(chain_block.timestamp, 0x65a0_f000);
        assert_eq!(chain_block.txs.len(), 2);
        assert_eq!(chain_block.txs[0].idx, 0);
        assert_eq!(chain_block.txs[0].timestamp, 0x65a0_f000);
        // contract creation: empty `to`
        assert_eq!(chain_block.txs[1].to, "");
        assert_eq!(chain_block.txs[1].idx, 1);
        assert_eq!(chain_block.receipts.len(), 1);
        assert_eq!(chain_block.receipts[0].logs[0].data, "0x");
    }

    #[test]
    fn malformed_quantities_fail_conversion() {
        let block = RpcBlock {
            number: "0x10".to_owned(),
            timestamp: "not-hex".to_owned(),
            transactions: vec![],
        };
        assert!(matches!(
            block.into_chain_block(vec![]),
            Err(WireError::BadQuantity(_))
        ));
    }
}
