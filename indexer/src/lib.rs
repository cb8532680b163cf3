// indexer/src/lib.rs
//! The indexer core: a deterministic state machine over an ordered
//! block stream.
//!
//! [`BlockApplier`] consumes contiguous blocks, turning calldata into
//! inscriptions and receipts into listing-transfer events; [`Ledger`]
//! owns the resulting token state and records a verdict for every
//! attempted RRC-20 operation. Everything here is synchronous and free
//! of I/O.

pub mod applier;
pub mod ledger;

pub use applier::{ApplyError, BlockApplier};
pub use ledger::Ledger;
