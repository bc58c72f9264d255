//! ============================================================================
//! Identity Provider - Wallet account and chain access
//! ============================================================================
//! The session talks to a wallet through this trait. `JsonRpcProvider` backs
//! it with an Ethereum JSON-RPC endpoint; tests substitute scripted doubles.
//! ============================================================================

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::rpc::{
    parse_hex_u64, JsonRpcClient, RpcError, METHOD_NOT_FOUND_CODE, REQUEST_PENDING_CODE,
    USER_REJECTED_CODE,
};
use crate::types::GateError;

/// Failures reported by an identity provider
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("A request is already pending")]
    RequestPending,

    #[error("{0}")]
    Other(String),
}

impl From<RpcError> for ProviderError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rpc { code, .. } if code == USER_REJECTED_CODE => ProviderError::UserRejected,
            RpcError::Rpc { code, .. } if code == REQUEST_PENDING_CODE => ProviderError::RequestPending,
            other => ProviderError::Other(other.to_string()),
        }
    }
}

impl From<ProviderError> for GateError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UserRejected => GateError::UserRejected,
            ProviderError::RequestPending => GateError::RequestPending,
            ProviderError::Other(msg) => GateError::ConnectionFailed(msg),
        }
    }
}

/// A wallet capable of exposing accounts and the active chain
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Ask the wallet for its accounts; the first one is the active identity
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Active network id
    async fn chain_id(&self) -> Result<u64, ProviderError>;
}

/// Identity provider backed by an Ethereum JSON-RPC node
pub struct JsonRpcProvider {
    rpc: JsonRpcClient,
}

impl JsonRpcProvider {
    pub fn new(rpc_url: &str) -> Self {
        info!("Using JSON-RPC identity provider at {}", rpc_url);
        Self {
            rpc: JsonRpcClient::new(rpc_url),
        }
    }
}

#[async_trait]
impl IdentityProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        match self
            .rpc
            .call::<Vec<String>>("eth_requestAccounts", json!([]))
            .await
        {
            Ok(accounts) => Ok(accounts),
            // Plain nodes only know eth_accounts
            Err(RpcError::Rpc { code, .. }) if code == METHOD_NOT_FOUND_CODE => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                Ok(self.rpc.call::<Vec<String>>("eth_accounts", json!([])).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let raw: String = self.rpc.call("eth_chainId", json!([])).await?;
        Ok(parse_hex_u64(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing;

    const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[tokio::test]
    async fn test_request_accounts_falls_back_to_eth_accounts() {
        let url = testing::spawn_node(|method, _| match method {
            "eth_accounts" => json!({ "result": [ALICE] }),
            "eth_chainId" => json!({ "result": "0x2105" }),
            other => testing::method_not_found(other),
        })
        .await;
        let provider = JsonRpcProvider::new(&url);

        assert_eq!(provider.request_accounts().await.unwrap(), vec![ALICE.to_string()]);
        assert_eq!(provider.chain_id().await.unwrap(), 8453);
    }

    #[tokio::test]
    async fn test_request_accounts_prefers_eth_request_accounts() {
        let url = testing::spawn_node(|method, _| match method {
            "eth_requestAccounts" => json!({ "result": [ALICE] }),
            "eth_accounts" => json!({ "result": [] }),
            other => testing::method_not_found(other),
        })
        .await;

        let accounts = JsonRpcProvider::new(&url).request_accounts().await.unwrap();
        assert_eq!(accounts, vec![ALICE.to_string()]);
    }

    #[tokio::test]
    async fn test_wallet_error_codes() {
        let url = testing::spawn_node(|method, _| match method {
            "eth_requestAccounts" => {
                json!({ "error": { "code": 4001, "message": "User rejected the request." } })
            }
            "eth_chainId" => json!({ "error": { "code": -32002, "message": "Already processing" } }),
            other => testing::method_not_found(other),
        })
        .await;
        let provider = JsonRpcProvider::new(&url);

        assert_eq!(provider.request_accounts().await, Err(ProviderError::UserRejected));
        assert_eq!(provider.chain_id().await, Err(ProviderError::RequestPending));
    }

    #[tokio::test]
    async fn test_malformed_chain_id() {
        let url = testing::spawn_node(|method, _| match method {
            "eth_chainId" => json!({ "result": "8453" }),
            other => testing::method_not_found(other),
        })
        .await;

        let err = JsonRpcProvider::new(&url).chain_id().await.unwrap_err();
        assert!(matches!(err, ProviderError::Other(_)));
    }

    #[test]
    fn test_rpc_error_mapping() {
        let rejected = RpcError::Rpc {
            code: 4001,
            message: "rejected".into(),
        };
        assert_eq!(ProviderError::from(rejected), ProviderError::UserRejected);

        let pending = RpcError::Rpc {
            code: -32002,
            message: "pending".into(),
        };
        assert_eq!(ProviderError::from(pending), ProviderError::RequestPending);

        let transport = RpcError::Transport("connection refused".into());
        assert!(matches!(ProviderError::from(transport), ProviderError::Other(_)));
    }

    #[test]
    fn test_provider_error_to_gate_error() {
        assert_eq!(GateError::from(ProviderError::UserRejected), GateError::UserRejected);
        assert_eq!(GateError::from(ProviderError::RequestPending), GateError::RequestPending);
        assert_eq!(
            GateError::from(ProviderError::Other("boom".into())),
            GateError::ConnectionFailed("boom".into())
        );
    }
}
