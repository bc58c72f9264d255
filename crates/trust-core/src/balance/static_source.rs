//! Deterministic balance source backed by an in-memory table.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{BalanceCheck, BalanceSource};
use crate::types::Identity;

/// Returns fixed balances per identity, or a forced failure
pub struct StaticBalanceSource {
    default_balance: f64,
    balances: RwLock<HashMap<Identity, f64>>,
    failure: RwLock<Option<String>>,
}

impl StaticBalanceSource {
    /// Every well-formed identity holds `default_balance`
    pub fn new(default_balance: f64) -> Self {
        Self {
            default_balance,
            balances: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
        }
    }

    /// Source whose lookups always fail with `error`
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            default_balance: 0.0,
            balances: RwLock::new(HashMap::new()),
            failure: RwLock::new(Some(error.into())),
        }
    }

    pub fn with_balance(mut self, identity: Identity, balance: f64) -> Self {
        self.balances.get_mut().insert(identity, balance);
        self
    }

    pub async fn set_balance(&self, identity: Identity, balance: f64) {
        self.balances.write().await.insert(identity, balance);
    }

    /// Make subsequent lookups fail (`Some`) or succeed again (`None`)
    pub async fn set_failure(&self, error: Option<String>) {
        *self.failure.write().await = error;
    }
}

#[async_trait]
impl BalanceSource for StaticBalanceSource {
    async fn fetch_balance(&self, identity: &Identity) -> BalanceCheck {
        if !identity.is_well_formed() {
            return BalanceCheck::invalid_identity();
        }

        if let Some(error) = self.failure.read().await.clone() {
            return BalanceCheck::failed(error);
        }

        let balance = self
            .balances
            .read()
            .await
            .get(identity)
            .copied()
            .unwrap_or(self.default_balance);

        debug!("Static balance for {}: {:.4}", identity.short(), balance);
        BalanceCheck::ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[tokio::test]
    async fn test_default_and_per_identity_balances() {
        let source = StaticBalanceSource::new(0.01).with_balance(Identity::new(ALICE), 0.5);

        assert_eq!(source.fetch_balance(&Identity::new(ALICE)).await, BalanceCheck::ok(0.5));
        assert_eq!(source.fetch_balance(&Identity::new(BOB)).await, BalanceCheck::ok(0.01));
    }

    #[tokio::test]
    async fn test_invalid_identity() {
        let source = StaticBalanceSource::new(1.0);
        let check = source.fetch_balance(&Identity::new("0x123")).await;
        assert_eq!(check.balance, 0.0);
        assert_eq!(check.error.as_deref(), Some("Invalid wallet address"));
    }

    #[tokio::test]
    async fn test_failure_toggle() {
        let source = StaticBalanceSource::failing("node unreachable");
        let alice = Identity::new(ALICE);

        let check = source.fetch_balance(&alice).await;
        assert_eq!(check, BalanceCheck::failed("node unreachable"));

        source.set_failure(None).await;
        source.set_balance(alice.clone(), 0.03).await;
        assert_eq!(source.fetch_balance(&alice).await, BalanceCheck::ok(0.03));
    }

    #[tokio::test]
    async fn test_deterministic() {
        let source = StaticBalanceSource::new(0.0137);
        let alice = Identity::new(ALICE);
        let first = source.fetch_balance(&alice).await;
        for _ in 0..5 {
            assert_eq!(source.fetch_balance(&alice).await, first);
        }
    }
}
