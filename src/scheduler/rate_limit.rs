//! Process-wide refresh gate.
//!
//! HeadHunter tolerates a single boost at a time per account, so every
//! refresh loop must pass through one shared gate before calling the
//! [`RefreshAction`]. Waiting for a due time or a backoff never touches the
//! gate; only the refresh call itself is serialized.

use std::sync::{Mutex, PoisonError};

use tokio::sync::MutexGuard;

use crate::domain::Item;
use crate::error::Result;
use crate::scheduler::refresh::RefreshAction;

/// Counters describing refresh outcomes across all items.
#[derive(Debug, Clone, Default)]
pub struct RefreshStats {
    /// Successful refreshes since start.
    pub total_refreshes: u64,
    /// Failed refreshes since start.
    pub total_failures: u64,
    /// Failures since the last success, across all items.
    pub consecutive_failures: u32,
}

impl RefreshStats {
    fn record_success(&mut self) {
        self.total_refreshes += 1;
        self.consecutive_failures = 0;
    }

    fn record_failure(&mut self) {
        self.total_failures += 1;
        self.consecutive_failures += 1;
    }
}

/// Single exclusive-access token guarding the refresh action.
#[derive(Debug, Default)]
pub struct RefreshGate {
    lock: tokio::sync::Mutex<()>,
    stats: Mutex<RefreshStats>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access.
    pub async fn acquire(&self) -> RefreshPermit<'_> {
        RefreshPermit {
            gate: self,
            _guard: self.lock.lock().await,
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> RefreshStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, outcome: &Result<()>) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(()) => stats.record_success(),
            Err(_) => stats.record_failure(),
        }
    }
}

/// Exclusive right to run one refresh; released on drop.
pub struct RefreshPermit<'a> {
    gate: &'a RefreshGate,
    _guard: MutexGuard<'a, ()>,
}

impl RefreshPermit<'_> {
    /// Run the refresh action while holding the gate.
    pub async fn refresh(self, action: &dyn RefreshAction, item: &Item) -> Result<()> {
        let outcome = action.refresh(item).await;
        self.gate.record(&outcome);
        outcome
    }
}
