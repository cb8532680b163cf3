// indexer/src/applier.rs
//! Applies blocks to the ledger in strict contiguous order.

use thiserror::Error;
use tracing::{debug, info};

use parser::{decode_listing_transfer, extract_inscription, parse_envelope, ExtractError};
use types::{ChainBlock, Inscription};

use crate::ledger::Ledger;

/// Structural failures that abort a block without touching state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("block {got} does not extend the chain at height {expected}")]
    NonContiguousBlock { expected: u64, got: u64 },
}

/// Drives the ledger over the ordered block stream: transactions first
/// (inscription path), then receipts (listing-event path), then the
/// height bump. Also owns the global inscription counter, which every
/// successfully extracted inscription consumes, protocol-valid or not.
pub struct BlockApplier {
    ledger: Ledger,
    next_inscription_number: u64,
}

impl BlockApplier {
    pub fn new(initial_height: u64) -> Self {
        Self {
            ledger: Ledger::new(initial_height),
            next_inscription_number: 0,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn apply_block(&mut self, block: &ChainBlock) -> Result<(), ApplyError> {
        let expected = self.ledger.height() + 1;
        if block.number != expected {
            return Err(ApplyError::NonContiguousBlock {
                expected,
                got: block.number,
            });
        }
        info!(
            number = block.number,
            txs = block.txs.len(),
            receipts = block.receipts.len(),
            "applying block"
        );

        for tx in &block.txs {
            let body = match extract_inscription(&tx.input) {
                Ok(body) => body,
                Err(ExtractError::NoDataUri) => continue,
                Err(err) => {
                    debug!(tx = %tx.id, %err, "dropping malformed data-uri calldata");
                    continue;
                }
            };
            let inscription = Inscription {
                number: self.next_inscription_number,
                hash: tx.id.clone(),
                from: tx.from.clone(),
                to: tx.to.clone(),
                block: tx.block,
                idx: tx.idx,
                timestamp: tx.timestamp,
                content_type: body.content_type,
                content: body.content,
            };
            self.next_inscription_number += 1;

            match parse_envelope(&inscription.content) {
                Ok(params) => {
                    self.ledger.apply_inscription(&inscription, &params);
                }
                Err(err) => {
                    debug!(number = inscription.number, %err, "inert inscription");
                }
            }
        }

        for receipt in &block.receipts {
            for log in &receipt.logs {
                if let Some(event) = decode_listing_transfer(log) {
                    self.ledger
                        .apply_listing_transfer(&receipt.tx_hash, &event, receipt.timestamp);
                }
            }
        }

        self.ledger.set_height(block.number);
        Ok(())
    }
}
