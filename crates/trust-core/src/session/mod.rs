//! ============================================================================
//! Connection Session - Wallet connection state machine
//! ============================================================================
//! Holds the connected identity and balance and derives the gate status.
//!
//! ## Phases
//! `Disconnected -> Connecting -> Connected`, `Connected <-> Refreshing`.
//!
//! State lives behind one async mutex that is never held across a provider
//! call. Every connect and disconnect bumps a generation counter; a result
//! that comes back under an older generation is discarded, so a slow
//! connect or refresh can never overwrite a later disconnect.
//! ============================================================================

mod notice;
mod state;

pub use notice::{Notice, NoticeLevel};
pub use state::{SessionOutcome, SessionPhase, SessionSnapshot};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::access::{GateStatus, TokenGate};
use crate::balance::{BalanceCheck, BalanceSource};
use crate::config::AppConfig;
use crate::network::{NetworkValidation, NetworkValidator};
use crate::provider::IdentityProvider;
use crate::types::{GateError, Identity};

/// Capacity of the notice channel; slow subscribers drop old notices
const NOTICE_CAPACITY: usize = 32;

const UNSUPPORTED_NETWORK_FALLBACK: &str =
    "Please switch to a supported network to use this application.";

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    identity: Identity,
    balance: f64,
    warning: Option<GateError>,
    generation: u64,
    connect_pending: bool,
    refresh_pending: bool,
}

/// What a successful connect attempt produced
struct Established {
    identity: Identity,
    balance: f64,
    warning: Option<GateError>,
}

/// A single wallet session
pub struct ConnectionSession {
    provider: Option<Arc<dyn IdentityProvider>>,
    balances: Arc<dyn BalanceSource>,
    validator: NetworkValidator,
    gate: TokenGate,
    timeout: Duration,
    state: Mutex<SessionState>,
    notices: broadcast::Sender<Notice>,
}

impl ConnectionSession {
    /// Create a disconnected session. `provider` is `None` when no wallet is
    /// available at all.
    pub fn new(
        provider: Option<Arc<dyn IdentityProvider>>,
        balances: Arc<dyn BalanceSource>,
        gate: TokenGate,
        validator: NetworkValidator,
    ) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            provider,
            balances,
            validator,
            gate,
            timeout: Duration::from_secs(crate::config::DEFAULT_PROVIDER_TIMEOUT_SECS),
            state: Mutex::new(SessionState::default()),
            notices,
        }
    }

    pub fn from_config(
        provider: Option<Arc<dyn IdentityProvider>>,
        balances: Arc<dyn BalanceSource>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            provider,
            balances,
            TokenGate::new(config.token.clone()),
            NetworkValidator::new(config.networks.clone()),
        )
        .with_timeout(config.provider_timeout)
    }

    /// Bound every provider and balance call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn gate(&self) -> &TokenGate {
        &self.gate
    }

    /// Receive notices published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    /// Identity and gate status, if connected with enough balance
    pub async fn require_access(&self) -> Result<(Identity, GateStatus), GateError> {
        let state = self.state.lock().await;
        if !state.phase.is_connected() {
            return Err(GateError::NotConnected);
        }
        let status = self.gate.require_access(state.balance)?;
        Ok((state.identity.clone(), status))
    }

    /// Connect to the wallet, validate the network and load the balance.
    ///
    /// Fails only when no provider exists or the account request fails.
    /// An unsupported network or a failed balance lookup still connects,
    /// with a zero balance and the problem reported in the outcome.
    pub async fn connect(&self) -> Result<SessionOutcome, GateError> {
        let ticket = {
            let mut state = self.state.lock().await;
            if state.connect_pending {
                return Err(GateError::ConnectInProgress);
            }
            if state.phase.is_connected() {
                return Err(GateError::AlreadyConnected);
            }
            state.generation += 1;
            state.connect_pending = true;
            state.phase = SessionPhase::Connecting;
            state.warning = None;
            state.generation
        };

        let result = self.establish().await;

        let mut state = self.state.lock().await;
        if state.generation != ticket {
            debug!("Discarding connect result from superseded attempt {}", ticket);
            return Err(GateError::Superseded);
        }
        state.connect_pending = false;

        match result {
            Ok(established) => {
                state.phase = SessionPhase::Connected;
                state.identity = established.identity;
                state.balance = established.balance;
                state.warning = established.warning.clone();

                let snapshot = self.snapshot_of(&state);
                drop(state);

                match &established.warning {
                    Some(w) => self.publish(Notice::for_error(w)),
                    None => self.publish(Notice::connected(&snapshot.identity)),
                }
                info!(
                    "Session connected: {} with {:.4} {}",
                    snapshot.identity.short(),
                    snapshot.balance,
                    self.gate.config().symbol
                );

                Ok(SessionOutcome {
                    snapshot,
                    warning: established.warning,
                })
            }
            Err(e) => {
                state.phase = SessionPhase::Disconnected;
                drop(state);
                warn!("Wallet connection failed: {}", e);
                self.publish(Notice::for_error(&e));
                Err(e)
            }
        }
    }

    /// Reset to disconnected. Always succeeds; in-flight results are dropped.
    pub async fn disconnect(&self) -> SessionSnapshot {
        let mut state = self.state.lock().await;
        let was_active = state.phase != SessionPhase::Disconnected;

        let generation = state.generation + 1;
        *state = SessionState {
            generation,
            ..SessionState::default()
        };
        let snapshot = self.snapshot_of(&state);
        drop(state);

        if was_active {
            info!("Session disconnected");
            self.publish(Notice::disconnected());
        }
        snapshot
    }

    /// Re-read the balance for the connected identity.
    ///
    /// Rejected with `NotConnected` unless connected. A failed lookup keeps
    /// the previous balance and is reported as the outcome's warning.
    pub async fn refresh(&self) -> Result<SessionOutcome, GateError> {
        let (ticket, identity) = {
            let mut state = self.state.lock().await;
            if state.refresh_pending {
                return Err(GateError::RefreshInProgress);
            }
            if state.phase != SessionPhase::Connected {
                return Err(GateError::NotConnected);
            }
            state.refresh_pending = true;
            state.phase = SessionPhase::Refreshing;
            (state.generation, state.identity.clone())
        };

        debug!("Refreshing balance for {}", identity.short());
        let check = self.fetch_balance(&identity).await;

        let mut state = self.state.lock().await;
        if state.generation != ticket {
            debug!("Discarding refresh result for {}", identity.short());
            return Err(GateError::Superseded);
        }
        state.refresh_pending = false;
        state.phase = SessionPhase::Connected;

        let warning = match check.into_result() {
            Ok(balance) => {
                state.balance = balance;
                if matches!(state.warning, Some(GateError::BalanceFetchFailed(_))) {
                    state.warning = None;
                }
                None
            }
            Err(e) => {
                state.warning = Some(e.clone());
                Some(e)
            }
        };

        let snapshot = self.snapshot_of(&state);
        drop(state);

        match &warning {
            Some(e) => {
                warn!("Balance refresh failed: {}", e);
                self.publish(Notice::refresh_failed(&e.to_string()));
            }
            None => self.publish(Notice::balance_updated(
                snapshot.balance,
                &self.gate.config().symbol,
            )),
        }

        Ok(SessionOutcome { snapshot, warning })
    }

    async fn establish(&self) -> Result<Established, GateError> {
        let provider = self.provider.as_deref().ok_or(GateError::ProviderMissing)?;

        let accounts = self
            .bounded(provider.request_accounts())
            .await
            .ok_or_else(|| GateError::ConnectionFailed("Wallet did not respond in time".into()))??;

        let identity = accounts
            .into_iter()
            .next()
            .map(Identity::new)
            .ok_or(GateError::NoAccount)?;
        info!("Connected to address {}", identity.short());

        let network = self
            .bounded(self.validator.validate(Some(provider)))
            .await
            .unwrap_or_else(|| NetworkValidation {
                is_supported: false,
                current_network: None,
                error: Some("Network check timed out".to_string()),
            });
        if !network.is_supported {
            let message = network
                .error
                .unwrap_or_else(|| UNSUPPORTED_NETWORK_FALLBACK.to_string());
            return Ok(Established {
                identity,
                balance: 0.0,
                warning: Some(GateError::UnsupportedNetwork(message)),
            });
        }

        let (balance, warning) = match self.fetch_balance(&identity).await.into_result() {
            Ok(balance) => (balance, None),
            Err(e) => (0.0, Some(e)),
        };

        Ok(Established {
            identity,
            balance,
            warning,
        })
    }

    async fn fetch_balance(&self, identity: &Identity) -> BalanceCheck {
        self.bounded(self.balances.fetch_balance(identity))
            .await
            .unwrap_or_else(|| BalanceCheck::failed("Balance request timed out"))
    }

    /// Run `fut` under the session timeout; `None` if it elapsed
    async fn bounded<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::time::timeout(self.timeout, fut).await.ok()
    }

    fn snapshot_of(&self, state: &SessionState) -> SessionSnapshot {
        SessionSnapshot {
            phase: state.phase,
            identity: state.identity.clone(),
            balance: state.balance,
            gate: state
                .phase
                .is_connected()
                .then(|| self.gate.evaluate(state.balance)),
            warning: state.warning.clone(),
        }
    }

    fn publish(&self, notice: Notice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }
}
