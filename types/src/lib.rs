// types/src/lib.rs
//! Domain types for the rosescriptions indexer.
//!
//! Chain records as delivered by the RPC collaborator, the extracted
//! inscription payload, the RRC-20 ledger entities, and the `Decimal`
//! number type all RRC-20 amounts are expressed in.

pub mod chain;
pub mod decimal;
pub mod inscription;
pub mod rrc20;

pub use chain::{ChainBlock, ChainReceipt, ChainTransaction, LogRecord};
pub use decimal::{Decimal, DecimalError};
pub use inscription::Inscription;
pub use rrc20::{ListingRecord, Operation, OperationRecord, Token, Verdict};
