//! Session phases and the read-only views handed to callers.

use serde::{Deserialize, Serialize};

use crate::access::GateStatus;
use crate::types::{GateError, Identity};

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Connected, with a balance refresh in flight
    Refreshing,
}

impl SessionPhase {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionPhase::Connected | SessionPhase::Refreshing)
    }
}

/// Point-in-time copy of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Identity,
    pub balance: f64,
    /// Derived from `balance`; `None` while disconnected
    pub gate: Option<GateStatus>,
    /// Last non-fatal problem (network or balance), if any
    pub warning: Option<GateError>,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.phase.is_connected()
    }

    /// Whether privileged note actions are currently allowed
    pub fn has_access(&self) -> bool {
        self.gate.as_ref().is_some_and(GateStatus::is_granted)
    }
}

/// Result of a connect or refresh that reached (or kept) a connected state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub snapshot: SessionSnapshot,
    /// Non-fatal problem surfaced by this operation
    pub warning: Option<GateError>,
}

impl SessionOutcome {
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}
