//! ============================================================================
//! ERC-20 Balance Source - On-chain $TRUST balance via JSON-RPC
//! ============================================================================
//! Calls `balanceOf(address)` on the token contract with `eth_call` and
//! scales the raw uint256 by the token decimals.
//! ============================================================================

use async_trait::async_trait;
use ethers::abi::{self, Token};
use ethers::types::{Address, U256};
use ethers::utils::{format_units, id};
use serde_json::json;
use tracing::{debug, warn};

use super::{BalanceCheck, BalanceSource};
use crate::config::TokenConfig;
use crate::rpc::{JsonRpcClient, RpcError};
use crate::types::Identity;

/// Queries an ERC-20 contract for an identity's balance
pub struct Erc20BalanceSource {
    rpc: JsonRpcClient,
    contract_address: String,
    decimals: u8,
}

impl Erc20BalanceSource {
    pub fn new(rpc_url: &str, token: &TokenConfig) -> Self {
        Self {
            rpc: JsonRpcClient::new(rpc_url),
            contract_address: token.contract_address.clone(),
            decimals: token.decimals,
        }
    }

    async fn query_balance(&self, address: Address) -> Result<f64, RpcError> {
        let call = json!({
            "to": self.contract_address,
            "data": balance_of_calldata(address),
        });
        let raw: String = self.rpc.call("eth_call", json!([call, "latest"])).await?;
        parse_token_amount(&raw, self.decimals)
    }
}

#[async_trait]
impl BalanceSource for Erc20BalanceSource {
    async fn fetch_balance(&self, identity: &Identity) -> BalanceCheck {
        let address = match identity.address() {
            Ok(address) => address,
            Err(_) => return BalanceCheck::invalid_identity(),
        };

        debug!(
            "Checking token balance for {} on contract {}",
            identity.short(),
            self.contract_address
        );

        match self.query_balance(address).await {
            Ok(balance) => {
                debug!("Token balance: {:.4}", balance);
                BalanceCheck::ok(balance)
            }
            Err(e) => {
                warn!("Failed to get token balance for {}: {}", identity.short(), e);
                BalanceCheck::failed(format!("Failed to check token balance: {}", e))
            }
        }
    }
}

/// ABI-encode `balanceOf(address)` as `0x`-prefixed calldata
pub fn balance_of_calldata(address: Address) -> String {
    let mut data = id("balanceOf(address)").to_vec();
    data.extend(abi::encode(&[Token::Address(address)]));
    format!("0x{}", hex::encode(data))
}

/// Convert the `0x`-prefixed uint256 word returned by `balanceOf` into a
/// human-readable amount
pub fn parse_token_amount(raw: &str, decimals: u8) -> Result<f64, RpcError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::Decode(format!("expected 0x-prefixed amount, got '{}'", raw)))?;

    // "0x" alone is what some nodes return for an empty account
    let bytes = hex::decode(digits)
        .map_err(|e| RpcError::Decode(format!("invalid hex amount '{}': {}", raw, e)))?;
    if bytes.len() > 32 {
        return Err(RpcError::Decode(format!(
            "amount '{}' does not fit in a uint256",
            raw
        )));
    }
    let value = U256::from_big_endian(&bytes);

    let formatted = format_units(value, decimals as u32)
        .map_err(|e| RpcError::Decode(format!("cannot scale amount by {} decimals: {}", decimals, e)))?;
    formatted
        .parse()
        .map_err(|e| RpcError::Decode(format!("invalid amount '{}': {}", formatted, e)))
}
