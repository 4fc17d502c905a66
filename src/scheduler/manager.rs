//! Boost scheduler.
//!
//! The BoostScheduler:
//! 1. De-duplicates discovered items by id (first seen wins, entries are never removed)
//! 2. Spawns one refresh loop task per new item
//! 3. Shares a single refresh gate between all loops
//! 4. Exposes `done()` and `teardown()` for coordinated shutdown

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::BoostContext;
use crate::domain::Item;
use crate::scheduler::rate_limit::{RefreshGate, RefreshStats};
use crate::scheduler::refresh::{LoopExit, RefreshAction, RefreshLoop};

/// Bookkeeping for one scheduled item.
struct ScheduleEntry {
    /// Stops this item's loop only
    stop: CancellationToken,
    /// Taken by `join()`
    handle: Option<JoinHandle<LoopExit>>,
}

/// Schedules one independent refresh loop per distinct item.
pub struct BoostScheduler {
    ctx: BoostContext,
    action: Arc<dyn RefreshAction>,
    gate: Arc<RefreshGate>,
    entries: Mutex<HashMap<String, ScheduleEntry>>,
    /// Fires on teardown; parent of every item's stop token.
    shutdown: CancellationToken,
}

impl BoostScheduler {
    /// Create a scheduler that boosts items with `action`.
    pub fn new(ctx: &BoostContext, action: Arc<dyn RefreshAction>) -> Self {
        Self {
            ctx: ctx.clone(),
            action,
            gate: Arc::new(RefreshGate::new()),
            entries: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, ScheduleEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start boosting `item` unless an item with the same id is already known.
    ///
    /// Returns true if a new refresh loop was spawned. Never blocks on the
    /// refresh itself.
    pub fn schedule(&self, item: Item) -> bool {
        let mut entries = self.entries();

        if entries.contains_key(&item.id) {
            tracing::debug!(id = %item.id, title = %item.title, "Item already scheduled, ignoring");
            return false;
        }

        let id = item.id.clone();
        let stop = self.shutdown.child_token();
        let refresh_loop = RefreshLoop {
            item,
            schedule: self.ctx.schedule,
            action: self.action.clone(),
            gate: self.gate.clone(),
            stop: stop.clone(),
            cancel: self.ctx.cancel.clone(),
        };

        let loop_id = id.clone();
        let handle = tokio::spawn(async move {
            let exit = refresh_loop.run().await;
            tracing::debug!(id = %loop_id, exit = ?exit, "Refresh loop exited");
            exit
        });

        entries.insert(
            id,
            ScheduleEntry {
                stop,
                handle: Some(handle),
            },
        );
        true
    }

    /// Signal that fires when there is nothing (left) to do.
    ///
    /// Evaluated at call time: with no known items the returned token is
    /// already cancelled, otherwise it is the shared teardown token.
    pub fn done(&self) -> CancellationToken {
        let entries = self.entries();
        if entries.is_empty() {
            let token = CancellationToken::new();
            token.cancel();
            token
        } else {
            self.shutdown.clone()
        }
    }

    /// Ask every refresh loop to stop at its next suspension point.
    ///
    /// Does not wait for the loops; see [`BoostScheduler::join`].
    pub fn teardown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::debug!(items = self.known_count(), "Tearing down refresh loops");
        }
        self.shutdown.cancel();
    }

    /// Stop a single item's loop. The id stays known and is not re-scheduled.
    pub fn stop(&self, id: &str) -> bool {
        match self.entries().get(id) {
            Some(entry) => {
                entry.stop.cancel();
                true
            }
            None => false,
        }
    }

    /// Wait for every spawned loop to exit.
    pub async fn join(&self) {
        let handles: Vec<(String, JoinHandle<LoopExit>)> = self
            .entries()
            .iter_mut()
            .filter_map(|(id, entry)| entry.handle.take().map(|h| (id.clone(), h)))
            .collect();

        for (id, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!(id = %id, error = ?e, "Refresh loop task panicked");
            }
        }
    }

    /// Number of distinct items ever scheduled.
    pub fn known_count(&self) -> usize {
        self.entries().len()
    }

    /// Number of refresh loops still running.
    pub fn active_count(&self) -> usize {
        self.entries()
            .values()
            .filter(|entry| entry.handle.as_ref().is_some_and(|h| !h.is_finished()))
            .count()
    }

    /// Refresh counters across all items.
    pub fn stats(&self) -> RefreshStats {
        self.gate.stats()
    }
}

impl Drop for BoostScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
