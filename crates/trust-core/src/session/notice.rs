//! ============================================================================
//! Notices - Transient user-facing notifications
//! ============================================================================
//! The session publishes one notice per user-visible outcome. Frontends
//! subscribe and render them as toasts; nothing blocks on delivery.
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::access::format_token_balance;
use crate::types::{GateError, Identity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Destructive,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level: NoticeLevel::Info,
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level: NoticeLevel::Destructive,
        }
    }

    pub fn connected(identity: &Identity) -> Self {
        Self::info("Wallet Connected", format!("Connected to {}", identity.short()))
    }

    pub fn disconnected() -> Self {
        Self::info("Wallet Disconnected", "Your wallet has been disconnected")
    }

    pub fn balance_updated(balance: f64, symbol: &str) -> Self {
        Self::info(
            "Balance Updated",
            format!("Current balance: {} {}", format_token_balance(balance), symbol),
        )
    }

    pub fn refresh_failed(reason: &str) -> Self {
        Self::destructive("Refresh Failed", reason)
    }

    /// Notice for a failed or degraded connect
    pub fn for_error(err: &GateError) -> Self {
        match err {
            GateError::ProviderMissing => Self::destructive(
                "Wallet Not Found",
                "Please install MetaMask or another Web3 wallet to continue.",
            ),
            GateError::UserRejected => Self::destructive(
                "Connection Rejected",
                "You rejected the connection request. Please try again and approve the connection.",
            ),
            GateError::RequestPending => Self::destructive(
                "Connection Pending",
                "A connection request is already pending. Please check your wallet extension.",
            ),
            GateError::NoAccount => Self::destructive(
                "No Account Selected",
                "Please select an account in your wallet and try again.",
            ),
            GateError::ConnectionFailed(msg) => Self::destructive("Connection Failed", msg.as_str()),
            GateError::UnsupportedNetwork(msg) => {
                Self::destructive("Network Not Supported", msg.as_str())
            }
            GateError::BalanceFetchFailed(msg) => {
                Self::destructive("Balance Check Failed", msg.as_str())
            }
            GateError::AccessDenied(msg) => Self::destructive("Access Denied", msg.as_str()),
            other => Self::destructive("Wallet Error", other.to_string()),
        }
    }
}
