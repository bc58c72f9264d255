//! ============================================================================
//! Access Types - Token gate decision and status
//! ============================================================================
//! Defines the three-way gate decision derived from a $TRUST balance and the
//! status record shown to the user.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Message shown once the threshold is met
pub const ACCESS_GRANTED_MESSAGE: &str = "Access granted! You can create and manage notes.";

/// Gate decision for a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Holds at least the minimum balance
    Granted,
    /// Holds some tokens, but fewer than required
    Insufficient,
    /// Holds nothing
    Denied,
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }

    /// Get human-readable badge label
    pub fn display_name(&self) -> &'static str {
        match self {
            GateDecision::Granted => "Access Granted",
            GateDecision::Insufficient => "Insufficient Balance",
            GateDecision::Denied => "Access Denied",
        }
    }
}

/// Derived gate status. Never stored, recomputed from the current balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateStatus {
    pub status: GateDecision,
    pub message: String,
    /// Progress toward the threshold, in [0, 100]
    pub progress: f64,
}

impl GateStatus {
    pub fn is_granted(&self) -> bool {
        self.status.is_granted()
    }
}

/// Format a token balance for display
pub fn format_token_balance(balance: f64) -> String {
    if balance >= 1_000_000.0 {
        format!("{:.1}M", balance / 1_000_000.0)
    } else if balance >= 1_000.0 {
        format!("{:.1}K", balance / 1_000.0)
    } else if balance < 1.0 {
        format!("{:.4}", balance)
    } else {
        let s = format!("{:.3}", balance);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
