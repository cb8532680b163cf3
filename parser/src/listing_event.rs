// parser/src/listing_event.rs
//! Decoder for the marketplace listing-transfer event log.
//!
//! The event carries two indexed addresses and a 32-byte listing id:
//!
//! `rosescriptions_protocol_TransferRRC20TokenForListing(address from indexed, address to indexed, bytes32 id)`

use std::sync::LazyLock;

use sha3::{Digest, Keccak256};
use tracing::warn;

use types::LogRecord;

/// Canonical signature hashed into the event's topic 0.
pub const LISTING_TRANSFER_SIGNATURE: &str =
    "rosescriptions_protocol_TransferRRC20TokenForListing(address,address,bytes32)";

static LISTING_TRANSFER_TOPIC: LazyLock<String> = LazyLock::new(|| {
    format!(
        "0x{}",
        hex::encode(Keccak256::digest(LISTING_TRANSFER_SIGNATURE.as_bytes()))
    )
});

/// Topic 0 of the listing-transfer event as `0x`-prefixed lowercase hex.
pub fn listing_transfer_topic() -> &'static str {
    &LISTING_TRANSFER_TOPIC
}

/// A decoded listing-transfer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTransfer {
    /// Seller, as claimed by the marketplace contract.
    pub from: String,
    /// Buyer to credit.
    pub to: String,
    /// Listing id; matches the hash of the listing inscription.
    pub id: [u8; 32],
    /// The contract that emitted the log.
    pub contract_address: String,
}

impl ListingTransfer {
    /// The id as `0x`-prefixed lowercase hex, the form listings are
    /// keyed by.
    pub fn id_hex(&self) -> String {
        format!("0x{}", hex::encode(self.id))
    }
}

/// Decode a log into a [`ListingTransfer`].
///
/// Logs whose topic 0 is anything else return `None` silently; logs
/// that match but are malformed are dropped with a warning.
pub fn decode_listing_transfer(log: &LogRecord) -> Option<ListingTransfer> {
    let topic0 = log.topics.first()?;
    if topic0.to_lowercase() != listing_transfer_topic() {
        return None;
    }
    if log.topics.len() != 3 {
        warn!(
            topics = log.topics.len(),
            address = %log.address,
            "listing-transfer log with unexpected topic count"
        );
        return None;
    }
    let Some(from) = topic_address(&log.topics[1]) else {
        warn!(topic = %log.topics[1], "malformed from topic in listing-transfer log");
        return None;
    };
    let Some(to) = topic_address(&log.topics[2]) else {
        warn!(topic = %log.topics[2], "malformed to topic in listing-transfer log");
        return None;
    };
    let Some(id) = data_word(&log.data) else {
        warn!(data = %log.data, "listing-transfer log data is shorter than 32 bytes");
        return None;
    };
    Some(ListingTransfer {
        from,
        to,
        id,
        contract_address: log.address.to_lowercase(),
    })
}

/// Low 20 bytes of a 32-byte topic, as a `0x`-prefixed lowercase address.
fn topic_address(topic: &str) -> Option<String> {
    let bytes = hex::decode(topic.strip_prefix("0x")?).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    Some(format!("0x{}", hex::encode(&bytes[12..])))
}

/// First 32-byte word of the log data.
fn data_word(data: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(data.strip_prefix("0x").unwrap_or(data)).ok()?;
    let word = bytes.get(..32)?;
    let mut id = [0u8; 32];
    id.copy_from_slice(word);
    Some(id)
}
