//! ============================================================================
//! Token Gate - Balance to access decision
//! ============================================================================
//! Pure evaluation of a balance against the configured threshold, plus a
//! configured gate used to guard privileged note operations.
//! ============================================================================

use tracing::warn;

use super::types::{GateDecision, GateStatus, ACCESS_GRANTED_MESSAGE};
use crate::config::{TokenConfig, TRUST_SYMBOL};
use crate::types::GateError;

/// Evaluate a balance against a threshold for the $TRUST token.
///
/// Deterministic and side-effect free.
pub fn evaluate_gate(balance: f64, threshold: f64) -> GateStatus {
    evaluate_gate_for(balance, threshold, TRUST_SYMBOL)
}

/// Evaluate a balance against a threshold, naming `symbol` in the message
pub fn evaluate_gate_for(balance: f64, threshold: f64, symbol: &str) -> GateStatus {
    // A balance that is not a real number holds nothing
    let balance = if balance.is_finite() { balance } else { 0.0 };

    if balance >= threshold {
        return GateStatus {
            status: GateDecision::Granted,
            message: ACCESS_GRANTED_MESSAGE.to_string(),
            progress: 100.0,
        };
    }

    // balance < threshold here; the clamp only matters for negative input
    let ratio = balance / threshold * 100.0;
    let progress = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 100.0) };
    let needed = threshold - balance;

    GateStatus {
        status: if balance > 0.0 {
            GateDecision::Insufficient
        } else {
            GateDecision::Denied
        },
        message: format!("You need {:.4} more {} tokens for access.", needed, symbol),
        progress,
    }
}

/// Gate bound to a token configuration
#[derive(Debug, Clone)]
pub struct TokenGate {
    config: TokenConfig,
}

impl TokenGate {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.config.minimum_balance
    }

    pub fn evaluate(&self, balance: f64) -> GateStatus {
        evaluate_gate_for(balance, self.config.minimum_balance, &self.config.symbol)
    }

    /// Returns the status if access is granted, `AccessDenied` otherwise
    pub fn require_access(&self, balance: f64) -> Result<GateStatus, GateError> {
        let status = self.evaluate(balance);
        if status.is_granted() {
            Ok(status)
        } else {
            warn!(
                "Access denied: balance {} {} below threshold {}",
                balance, self.config.symbol, self.config.minimum_balance
            );
            Err(GateError::AccessDenied(status.message))
        }
    }
}

impl Default for TokenGate {
    fn default() -> Self {
        Self::new(TokenConfig::default())
    }
}
