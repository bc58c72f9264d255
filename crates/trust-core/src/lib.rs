//! ============================================================================
//! TRUST-CORE: Token-gated access for TRUST Notes
//! ============================================================================
//! This crate handles all backend logic for TRUST Notes:
//! - Wallet connection session (connect / refresh / disconnect)
//! - Supported network validation
//! - $TRUST balance lookup (static or ERC-20 over JSON-RPC)
//! - Token gate evaluation guarding note management
//! - Local note storage via redb, partitioned by wallet
//! ============================================================================

pub mod access;
pub mod balance;
pub mod config;
pub mod network;
pub mod notes;
pub mod provider;
pub mod rpc;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use access::{evaluate_gate, GateDecision, GateStatus, TokenGate};
pub use balance::{BalanceCheck, BalanceSource, Erc20BalanceSource, StaticBalanceSource};
pub use config::{AppConfig, NetworkInfo, SupportedNetworks, TokenConfig};
pub use network::{NetworkValidation, NetworkValidator};
pub use notes::{Note, NoteDraft, NoteSort, NoteStore};
pub use provider::{IdentityProvider, JsonRpcProvider, ProviderError};
pub use session::{ConnectionSession, Notice, SessionOutcome, SessionPhase, SessionSnapshot};
pub use types::{GateError, Identity};
