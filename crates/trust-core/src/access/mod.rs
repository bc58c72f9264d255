//! ============================================================================
//! Access Module - Token-gated access control for TRUST Notes
//! ============================================================================
//! Maps a $TRUST balance to an access decision.
//!
//! ## Decisions
//! - **Granted**: balance >= minimum, notes can be created and managed
//! - **Insufficient**: some tokens, below the minimum
//! - **Denied**: no tokens
//!
//! ## Usage
//! ```rust,ignore
//! use trust_core::access::{evaluate_gate, TokenGate};
//!
//! let status = evaluate_gate(0.01, 0.02);
//! let gate = TokenGate::new(config.token.clone());
//! gate.require_access(balance)?;
//! ```
//! ============================================================================

mod gate;
mod types;

pub use gate::{evaluate_gate, evaluate_gate_for, TokenGate};
pub use types::{format_token_balance, GateDecision, GateStatus, ACCESS_GRANTED_MESSAGE};
