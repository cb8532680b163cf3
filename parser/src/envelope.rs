// parser/src/envelope.rs
//! Recognition of the RRC-20 JSON envelope inside inscription content.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use types::rrc20::PROTOCOL_NAME;

/// Why an inscription's content is not an RRC-20 envelope. The caller
/// treats the inscription as inert; nothing is recorded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("content is not a JSON object")]
    NotJson,
    #[error("content is not an rrc-20 inscription")]
    NotRrc20,
}

/// Parse inscription content into the RRC-20 string parameter map.
///
/// Content is trimmed and must open with `{`. Fields whose values are
/// not strings are dropped. The map is accepted when its `p` field is
/// non-blank and lowercases to `rrc-20`.
pub fn parse_envelope(content: &str) -> Result<BTreeMap<String, String>, EnvelopeError> {
    let content = content.trim();
    if !content.starts_with('{') {
        return Err(EnvelopeError::NotJson);
    }
    let object: Map<String, Value> =
        serde_json::from_str(content).map_err(|_| EnvelopeError::NotJson)?;

    let mut params = BTreeMap::new();
    for (key, value) in object {
        if let Value::String(value) = value {
            params.insert(key, value);
        }
    }

    match params.get("p") {
        Some(p) if !p.trim().is_empty() && p.to_lowercase() == PROTOCOL_NAME => Ok(params),
        _ => Err(EnvelopeError::NotRrc20),
    }
}
