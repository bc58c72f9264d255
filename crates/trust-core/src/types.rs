//! ============================================================================
//! Core Types for TRUST Notes
//! ============================================================================
//! Wallet identity handle and the error taxonomy shared by the session,
//! network validator and balance sources. Serializable so a frontend can
//! render them directly.
//! ============================================================================

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected length of a wallet address: `0x` followed by 40 hex digits
pub const IDENTITY_LEN: usize = 42;

/// Wallet address identifying the connected actor.
/// An empty handle means "no identity".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap a raw handle as returned by the provider. Not validated here;
    /// balance sources check well-formedness themselves.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate a wallet address
    pub fn parse(raw: &str) -> Result<Self, GateError> {
        let identity = Self::new(raw.trim());
        identity.validate()?;
        Ok(identity)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a `0x`-prefixed, 42 character hex address
    pub fn is_well_formed(&self) -> bool {
        self.address().is_ok()
    }

    /// The handle as an EVM address
    pub fn address(&self) -> Result<Address, GateError> {
        if self.0.len() != IDENTITY_LEN || !self.0.starts_with("0x") {
            return Err(GateError::InvalidIdentity);
        }
        self.0.parse().map_err(|_| GateError::InvalidIdentity)
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if self.is_well_formed() {
            Ok(())
        } else {
            Err(GateError::InvalidIdentity)
        }
    }

    /// Abbreviated form for display, e.g. `0x1234...abcd`
    pub fn short(&self) -> String {
        if self.0.len() <= 10 || !self.0.is_ascii() {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error types for wallet connection and token gating.
///
/// `UnsupportedNetwork` and `BalanceFetchFailed` are non-fatal: the session
/// reports them as warnings alongside a degraded connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum GateError {
    #[error("Invalid wallet address")]
    InvalidIdentity,

    #[error("No Web3 provider found")]
    ProviderMissing,

    #[error("Connection request rejected by user")]
    UserRejected,

    #[error("A connection request is already pending in the wallet")]
    RequestPending,

    #[error("No account selected")]
    NoAccount,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("{0}")]
    UnsupportedNetwork(String),

    #[error("{0}")]
    BalanceFetchFailed(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Wallet already connected")]
    AlreadyConnected,

    #[error("A connect attempt is already in progress")]
    ConnectInProgress,

    #[error("A balance refresh is already in progress")]
    RefreshInProgress,

    #[error("Session changed before the operation completed; result discarded")]
    Superseded,

    #[error("Access denied: {0}")]
    AccessDenied(String),
}

impl GateError {
    /// Whether the session still reaches (or stays in) a connected state
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            GateError::UnsupportedNetwork(_) | GateError::BalanceFetchFailed(_)
        )
    }
}
