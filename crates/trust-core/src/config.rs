//! ============================================================================
//! Configuration - Token gate and network settings
//! ============================================================================
//! Immutable configuration values handed to the gate evaluator, network
//! validator and balance sources at construction. Defaults describe the
//! $TRUST token on Base; `AppConfig::from_env` applies overrides.
//! ============================================================================

use anyhow::{anyhow, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Placeholder $TRUST token contract address
pub const TRUST_CONTRACT_ADDRESS: &str = "0x1234567890123456789012345678901234567890";

/// Token symbol used in gate messages
pub const TRUST_SYMBOL: &str = "TRUST";

/// Token decimals (standard ERC-20)
pub const TRUST_DECIMALS: u8 = 18;

/// Minimum $TRUST holdings for access (human-readable amount, not raw)
pub const TRUST_MINIMUM_BALANCE: f64 = 0.02;

/// Base mainnet chain id
pub const BASE_CHAIN_ID: u64 = 8453;

/// Base Sepolia testnet chain id
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// Default bound on a single provider or balance call
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;

/// Token gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub contract_address: String,
    pub symbol: String,
    /// Threshold for access
    pub minimum_balance: f64,
    /// Informational; used to scale raw on-chain amounts
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract_address: TRUST_CONTRACT_ADDRESS.to_string(),
            symbol: TRUST_SYMBOL.to_string(),
            minimum_balance: TRUST_MINIMUM_BALANCE,
            decimals: TRUST_DECIMALS,
        }
    }
}

impl TokenConfig {
    /// Default token config with a different threshold
    pub fn with_minimum_balance(minimum_balance: f64) -> Self {
        Self {
            minimum_balance,
            ..Self::default()
        }
    }
}

/// Display details for a supported network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub name: String,
    pub rpc_url: String,
    pub block_explorer: String,
}

impl NetworkInfo {
    pub fn new(name: &str, rpc_url: &str, block_explorer: &str) -> Self {
        Self {
            name: name.to_string(),
            rpc_url: rpc_url.to_string(),
            block_explorer: block_explorer.to_string(),
        }
    }
}

/// Lookup table of supported network ids, ordered by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedNetworks(BTreeMap<u64, NetworkInfo>);

impl SupportedNetworks {
    pub fn new(networks: impl IntoIterator<Item = (u64, NetworkInfo)>) -> Self {
        Self(networks.into_iter().collect())
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.0.contains_key(&chain_id)
    }

    pub fn get(&self, chain_id: u64) -> Option<&NetworkInfo> {
        self.0.get(&chain_id)
    }

    /// Display names in table order
    pub fn names(&self) -> Vec<&str> {
        self.0.values().map(|n| n.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &NetworkInfo)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SupportedNetworks {
    fn default() -> Self {
        Self::new([
            (
                BASE_CHAIN_ID,
                NetworkInfo::new("Base", "https://mainnet.base.org", "https://basescan.org"),
            ),
            (
                BASE_SEPOLIA_CHAIN_ID,
                NetworkInfo::new(
                    "Base Sepolia",
                    "https://sepolia.base.org",
                    "https://sepolia.basescan.org",
                ),
            ),
        ])
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: TokenConfig,
    pub networks: SupportedNetworks,
    /// JSON-RPC endpoint for the wallet provider and balance queries
    pub rpc_url: String,
    /// Notes database path; `None` uses ~/.trust-notes/notes.redb
    pub db_path: Option<PathBuf>,
    pub provider_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            networks: SupportedNetworks::default(),
            rpc_url: "https://mainnet.base.org".to_string(),
            db_path: None,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by TRUST_* environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("TRUST_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(address) = lookup("TRUST_TOKEN_ADDRESS") {
            let address = address.trim();
            address
                .parse::<Address>()
                .map_err(|e| anyhow!("Invalid TRUST_TOKEN_ADDRESS '{}': {}", address, e))?;
            config.token.contract_address = address.to_string();
        }
        if let Some(raw) = lookup("TRUST_MIN_BALANCE") {
            let min: f64 = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid TRUST_MIN_BALANCE '{}': {}", raw, e))?;
            if !min.is_finite() || min < 0.0 {
                return Err(anyhow!("TRUST_MIN_BALANCE must be a non-negative number, got {}", raw));
            }
            config.token.minimum_balance = min;
        }
        if let Some(raw) = lookup("TRUST_TOKEN_DECIMALS") {
            config.token.decimals = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid TRUST_TOKEN_DECIMALS '{}': {}", raw, e))?;
        }
        if let Some(path) = lookup("TRUST_NOTES_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("TRUST_PROVIDER_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid TRUST_PROVIDER_TIMEOUT_SECS '{}': {}", raw, e))?;
            config.provider_timeout = Duration::from_secs(secs);
        }

        debug!(
            "Loaded config: rpc={}, threshold={} {}, networks={}",
            config.rpc_url,
            config.token.minimum_balance,
            config.token.symbol,
            config.networks.len()
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_token_config_default() {
        let token = TokenConfig::default();
        assert_eq!(token.minimum_balance, 0.02);
        assert_eq!(token.decimals, 18);
        assert_eq!(token.symbol, "TRUST");
    }

    #[test]
    fn test_default_networks_ordered() {
        let networks = SupportedNetworks::default();
        assert!(networks.contains(8453));
        assert!(networks.contains(84532));
        assert!(!networks.contains(1));
        assert_eq!(networks.names(), vec!["Base", "Base Sepolia"]);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.token, TokenConfig::default());
        assert_eq!(config.provider_timeout, Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS));
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TRUST_RPC_URL", "http://localhost:8545"),
            ("TRUST_MIN_BALANCE", "1.5"),
            ("TRUST_TOKEN_DECIMALS", "6"),
            ("TRUST_NOTES_DB_PATH", "/tmp/notes.redb"),
            ("TRUST_PROVIDER_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.token.minimum_balance, 1.5);
        assert_eq!(config.token.decimals, 6);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/notes.redb")));
        assert_eq!(config.provider_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        assert!(AppConfig::from_lookup(lookup_from(&[("TRUST_MIN_BALANCE", "lots")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("TRUST_MIN_BALANCE", "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("TRUST_TOKEN_DECIMALS", "300")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("TRUST_TOKEN_ADDRESS", "0x1234")])).is_err());
    }

    #[test]
    fn test_from_lookup_token_address() {
        let token = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";
        let config = AppConfig::from_lookup(lookup_from(&[("TRUST_TOKEN_ADDRESS", token)])).unwrap();
        assert_eq!(config.token.contract_address, token);
    }
}
