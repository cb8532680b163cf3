// types/src/inscription.rs

use serde::{Deserialize, Serialize};

/// A `data:`-URI payload extracted from transaction calldata.
///
/// `number` is the global extraction counter: every successfully
/// extracted inscription consumes one, whether or not its content turns
/// out to be a valid protocol operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inscription {
    pub number: u64,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub block: u64,
    pub idx: u32,
    pub timestamp: u64,
    pub content_type: String,
    pub content: String,
}
