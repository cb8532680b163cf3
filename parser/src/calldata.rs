// parser/src/calldata.rs
//! Extraction of `data:`-URI inscriptions from transaction calldata.

use thiserror::Error;

/// `0x` + hex of the ASCII bytes `data:`. Checking the prefix on the
/// hex string avoids decoding the calldata of every ordinary
/// transaction.
const DATA_URI_HEX_PREFIX: &str = "0x646174613a";

/// Byte offset of the first content-type byte, right after `data:`.
const CONTENT_TYPE_START: usize = 5;

/// Why a transaction's calldata is not an inscription. Callers treat
/// every variant as "not ours" and move on; nothing is recorded.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("calldata does not start with a data: payload")]
    NoDataUri,
    #[error("calldata is not valid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
    #[error("data: payload has no content")]
    NoContent,
    #[error("payload is not valid utf-8")]
    NotUtf8,
}

/// Content type and content of an extracted inscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionBody {
    pub content_type: String,
    pub content: String,
}

/// Split a transaction's `input` into content type and content.
///
/// The decoded calldata must look like `data:<content type>,<content>`.
/// An empty content type defaults to `text/plain`; a missing comma, or
/// a comma as the final byte, means there is no content; the content
/// (and the content type) must be valid UTF-8.
pub fn extract_inscription(input: &str) -> Result<InscriptionBody, ExtractError> {
    if !input.starts_with(DATA_URI_HEX_PREFIX) {
        return Err(ExtractError::NoDataUri);
    }
    let bytes = hex::decode(&input[2..])?;

    let comma = bytes
        .iter()
        .position(|&b| b == b',')
        .ok_or(ExtractError::NoContent)?;
    if comma == bytes.len() - 1 {
        return Err(ExtractError::NoContent);
    }

    let content_type = if comma > CONTENT_TYPE_START {
        String::from_utf8(bytes[CONTENT_TYPE_START..comma].to_vec())
            .map_err(|_| ExtractError::NotUtf8)?
    } else {
        "text/plain".to_owned()
    };
    let content =
        String::from_utf8(bytes[comma + 1..].to_vec()).map_err(|_| ExtractError::NotUtf8)?;

    Ok(InscriptionBody {
        content_type,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calldata(payload: &str) -> String {
        format!("0x{}", hex::encode(payload.as_bytes()))
    }

    #[test]
    fn extracts_content_with_default_content_type() {
        let body = extract_inscription(&calldata("data:,hello")).unwrap();
        assert_eq!(body.content_type, "text/plain");
        assert_eq!(body.content, "hello");
    }

    #[test]
    fn extracts_explicit_content_type() {
        let body =
            extract_inscription(&calldata("data:application/json,{\"p\":\"rrc-20\"}")).unwrap();
        assert_eq!(body.content_type, "application/json");
        assert_eq!(body.content, "{\"p\":\"rrc-20\"}");
    }

    #[test]
    fn content_may_contain_further_commas() {
        let body = extract_inscription(&calldata("data:text/plain,a,b,c")).unwrap();
        assert_eq!(body.content, "a,b,c");
    }

    #[test]
    fn rejects_non_data_calldata() {
        assert!(matches!(
            extract_inscription("0xa9059cbb000000"),
            Err(ExtractError::NoDataUri)
        ));
        assert!(matches!(
            extract_inscription(""),
            Err(ExtractError::NoDataUri)
        ));
        // prefix comparison is on the lowercase hex form
        assert!(matches!(
            extract_inscription("0x646174613A2C68"),
            Err(ExtractError::NoDataUri)
        ));
    }

    #[test]
    fn rejects_payload_without_content() {
        assert!(matches!(
            extract_inscription(&calldata("data:text/plain")),
            Err(ExtractError::NoContent)
        ));
        assert!(matches!(
            extract_inscription(&calldata("data:,")),
            Err(ExtractError::NoContent)
        ));
    }

    #[test]
    fn rejects_bad_hex_and_bad_utf8() {
        assert!(matches!(
            extract_inscription("0x646174613a2c68zz"),
            Err(ExtractError::BadHex(_))
        ));
        // data:,<0xff 0xfe>
        assert!(matches!(
            extract_inscription("0x646174613a2cfffe"),
            Err(ExtractError::NotUtf8)
        ));
    }
}
