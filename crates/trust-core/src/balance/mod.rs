//! ============================================================================
//! Balance Module - Token balance lookup for a wallet identity
//! ============================================================================
//! One async capability, `fetch_balance`, with two implementations:
//! - **StaticBalanceSource**: deterministic table, for tests and offline use
//! - **Erc20BalanceSource**: `balanceOf` over Ethereum JSON-RPC
//!
//! Sources never fail outright. A malformed identity or an upstream error is
//! reported as a zero balance with an error description.
//! ============================================================================

mod erc20;
mod static_source;

pub use erc20::{balance_of_calldata, parse_token_amount, Erc20BalanceSource};
pub use static_source::StaticBalanceSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{GateError, Identity};

/// Result of a balance lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceCheck {
    pub balance: f64,
    pub error: Option<String>,
}

impl BalanceCheck {
    pub fn ok(balance: f64) -> Self {
        Self {
            balance,
            error: None,
        }
    }

    /// Failed lookup, paired with the safe default of zero
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            balance: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn invalid_identity() -> Self {
        Self::failed(GateError::InvalidIdentity.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the balance meets `threshold` (false on error)
    pub fn has_access(&self, threshold: f64) -> bool {
        self.is_ok() && self.balance >= threshold
    }

    /// Split into the balance or a `BalanceFetchFailed` error
    pub fn into_result(self) -> Result<f64, GateError> {
        match self.error {
            None => Ok(self.balance),
            Some(msg) => Err(GateError::BalanceFetchFailed(msg)),
        }
    }
}

/// Anything that can report a token balance for an identity
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Look up the current balance. No caching; every call re-queries.
    async fn fetch_balance(&self, identity: &Identity) -> BalanceCheck;
}
