// node/src/transport.rs
//! A thin JSON-RPC 2.0 over HTTP transport for talking to an EVM
//! node's `eth_*` namespace.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

/// Encapsulates an HTTP client and endpoint URL for JSON-RPC requests.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    url: String,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("url", &self.url)
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

/// Errors while sending or receiving JSON-RPC requests.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error (status {0}): {1}")]
    Http(u16, #[source] reqwest::Error),

    /// The response carried a JSON-RPC error object.
    #[error("RPC error: {0}")]
    Rpc(Value),

    #[error("invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing result field in response")]
    MissingResult,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // status 0 stands in for network-level failures without a code
        let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
        TransportError::Http(status, e)
    }
}

impl Transport {
    /// Create a transport pointing at `url`
    /// (e.g. "https://emerald.oasis.dev").
    pub fn new<U: Into<String>>(url: U) -> Self {
        Transport {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Send `method` with `params`, returning the raw `result` value.
    pub async fn send_request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, TransportError> {
        let req_body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let resp: Value = self
            .client
            .post(&self.url)
            .json(&req_body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = resp.get("error") {
            Err(TransportError::Rpc(err.clone()))
        } else if !resp.is_object() || resp.get("result").is_none() {
            Err(TransportError::MissingResult)
        } else {
            Ok(resp["result"].clone())
        }
    }

    /// Send `method` with `params`, deserializing the `result` into `R`.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<R, TransportError> {
        let response = self.send_request(method, params).await?;
        Ok(serde_json::from_value(response)?)
    }
}
