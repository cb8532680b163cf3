// parser/src/lib.rs
//! Recognizers for the three wire shapes the indexer consumes: `data:`
//! calldata inscriptions, the RRC-20 JSON envelope, and the marketplace
//! listing-transfer event log. All of them are pure; none consults
//! ledger state.

pub mod calldata;
pub mod envelope;
pub mod listing_event;

pub use calldata::{extract_inscription, ExtractError, InscriptionBody};
pub use envelope::{parse_envelope, EnvelopeError};
pub use listing_event::{decode_listing_transfer, listing_transfer_topic, ListingTransfer};
