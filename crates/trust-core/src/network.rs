//! ============================================================================
//! Network Validator - Supported chain checks
//! ============================================================================
//! Checks the wallet's active chain against the configured network table.
//! Failures are returned as values, never raised.
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SupportedNetworks;
use crate::provider::IdentityProvider;

const NO_PROVIDER_MESSAGE: &str = "No Web3 provider found";
const CHAIN_QUERY_FAILED_MESSAGE: &str =
    "Failed to check network. Please ensure your wallet is connected.";

/// Outcome of a network check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkValidation {
    pub is_supported: bool,
    pub current_network: Option<u64>,
    pub error: Option<String>,
}

/// Validates chain ids against an immutable network table
#[derive(Debug, Clone)]
pub struct NetworkValidator {
    networks: SupportedNetworks,
}

impl NetworkValidator {
    pub fn new(networks: SupportedNetworks) -> Self {
        Self { networks }
    }

    pub fn networks(&self) -> &SupportedNetworks {
        &self.networks
    }

    /// Exact membership check of `chain_id` against the table
    pub fn check_chain_id(&self, chain_id: u64) -> NetworkValidation {
        if self.networks.contains(chain_id) {
            return NetworkValidation {
                is_supported: true,
                current_network: Some(chain_id),
                error: None,
            };
        }

        NetworkValidation {
            is_supported: false,
            current_network: Some(chain_id),
            error: Some(format!(
                "Unsupported network. Please switch to one of: {}",
                self.networks.names().join(", ")
            )),
        }
    }

    /// Query the provider's active chain and check it
    pub async fn validate(&self, provider: Option<&dyn IdentityProvider>) -> NetworkValidation {
        let Some(provider) = provider else {
            return NetworkValidation {
                is_supported: false,
                current_network: None,
                error: Some(NO_PROVIDER_MESSAGE.to_string()),
            };
        };

        match provider.chain_id().await {
            Ok(chain_id) => {
                debug!("Current network ID: {}", chain_id);
                let validation = self.check_chain_id(chain_id);
                if !validation.is_supported {
                    warn!("Wallet is on unsupported network {}", chain_id);
                }
                validation
            }
            Err(e) => {
                warn!("Network validation error: {}", e);
                NetworkValidation {
                    is_supported: false,
                    current_network: None,
                    error: Some(CHAIN_QUERY_FAILED_MESSAGE.to_string()),
                }
            }
        }
    }
}

impl Default for NetworkValidator {
    fn default() -> Self {
        Self::new(SupportedNetworks::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkInfo;
    use crate::provider::ProviderError;
    use async_trait::async_trait;

    struct FixedChain(Result<u64, ProviderError>);

    #[async_trait]
    impl IdentityProvider for FixedChain {
        async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(vec![])
        }

        async fn chain_id(&self) -> Result<u64, ProviderError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_supported_ids() {
        let validator = NetworkValidator::default();
        for id in [8453, 84532] {
            let v = validator.check_chain_id(id);
            assert!(v.is_supported);
            assert_eq!(v.current_network, Some(id));
            assert!(v.error.is_none());
        }
    }

    #[test]
    fn test_unsupported_lists_all_names() {
        let validator = NetworkValidator::default();
        let v = validator.check_chain_id(1);
        assert!(!v.is_supported);
        assert_eq!(v.current_network, Some(1));
        assert_eq!(
            v.error.as_deref(),
            Some("Unsupported network. Please switch to one of: Base, Base Sepolia")
        );
    }

    #[test]
    fn test_custom_table() {
        let validator = NetworkValidator::new(SupportedNetworks::new([(
            31337,
            NetworkInfo::new("Anvil", "http://localhost:8545", ""),
        )]));
        assert!(validator.check_chain_id(31337).is_supported);
        assert!(!validator.check_chain_id(8453).is_supported);
    }

    #[tokio::test]
    async fn test_validate_without_provider() {
        let v = NetworkValidator::default().validate(None).await;
        assert!(!v.is_supported);
        assert_eq!(v.current_network, None);
        assert_eq!(v.error.as_deref(), Some("No Web3 provider found"));
    }

    #[tokio::test]
    async fn test_validate_with_provider() {
        let validator = NetworkValidator::default();

        let base = FixedChain(Ok(8453));
        assert!(validator.validate(Some(&base as &dyn IdentityProvider)).await.is_supported);

        let mainnet = FixedChain(Ok(1));
        let v = validator.validate(Some(&mainnet as &dyn IdentityProvider)).await;
        assert!(!v.is_supported);
        assert_eq!(v.current_network, Some(1));

        let broken = FixedChain(Err(ProviderError::Other("offline".into())));
        let v = validator.validate(Some(&broken as &dyn IdentityProvider)).await;
        assert!(!v.is_supported);
        assert_eq!(v.error.as_deref(), Some(CHAIN_QUERY_FAILED_MESSAGE));
    }
}
