//! ============================================================================
//! JSON-RPC Client - Minimal Ethereum JSON-RPC over HTTP
//! ============================================================================
//! Shared transport for the wallet provider (`eth_requestAccounts`,
//! `eth_chainId`) and the ERC-20 balance source (`eth_call`).
//! ============================================================================

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// JSON-RPC error code for a request the user rejected (EIP-1193)
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC error code for a request already pending in the wallet
pub const REQUEST_PENDING_CODE: i64 = -32002;

/// JSON-RPC error code for an unknown method
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Errors from a JSON-RPC round trip
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpcError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Failed to decode RPC response: {0}")]
    Decode(String),
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC client bound to one endpoint
pub struct JsonRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Call `method` and decode the `result` field
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!("RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        decode_response(body)
    }
}

fn decode_response<T: DeserializeOwned>(body: RpcResponse) -> Result<T, RpcError> {
    if let Some(err) = body.error {
        return Err(RpcError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    let result = body
        .result
        .ok_or_else(|| RpcError::Decode("response has neither result nor error".to_string()))?;

    serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
}

/// Parse a `0x`-prefixed hex quantity into a u64
pub fn parse_hex_u64(raw: &str) -> Result<u64, RpcError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| RpcError::Decode(format!("expected 0x-prefixed quantity, got '{}'", raw)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::Decode(format!("invalid hex quantity '{}': {}", raw, e)))
}
