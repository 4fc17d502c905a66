//! Per-item refresh loop.
//!
//! Each scheduled item gets its own task running [`RefreshLoop::run`]:
//! sleep until `last_refreshed_at + refresh_interval`, boost through the
//! shared [`RefreshGate`], and on any failure sleep `refresh_backoff` and try
//! the boost again without recomputing the due time. There is no retry limit.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::context::Schedule;
use crate::domain::Item;
use crate::error::Result;
use crate::scheduler::rate_limit::RefreshGate;

/// The rate-limited action re-applied to every item.
#[async_trait]
pub trait RefreshAction: Send + Sync {
    /// One refresh attempt.
    ///
    /// Returns [`BoostError::TooEarly`](crate::error::BoostError::TooEarly)
    /// when the remote side considers the item not yet due.
    async fn refresh(&self, item: &Item) -> Result<()>;
}

/// Why a refresh loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The item's own stop token (or scheduler teardown) fired
    Stopped,
    /// Process-wide cancellation fired
    Cancelled,
}

pub(crate) struct RefreshLoop {
    pub item: Item,
    pub schedule: Schedule,
    pub action: Arc<dyn RefreshAction>,
    pub gate: Arc<RefreshGate>,
    /// Child of the scheduler's teardown token
    pub stop: CancellationToken,
    pub cancel: CancellationToken,
}

impl RefreshLoop {
    pub async fn run(mut self) -> LoopExit {
        match self.drive().await {
            Ok(never) => match never {},
            Err(exit) => exit,
        }
    }

    async fn drive(&mut self) -> std::result::Result<Infallible, LoopExit> {
        let interval = chrono::Duration::from_std(self.schedule.refresh_interval).unwrap_or(chrono::Duration::MAX);

        loop {
            if let Some(wait) = self.item.wait_for(interval, Utc::now()) {
                tracing::info!(
                    id = %self.item.id,
                    title = %self.item.title,
                    boost_time = %self.item.next_due(interval),
                    "Scheduling item boost"
                );
                self.sleep(wait).await?;
            }

            loop {
                let permit = tokio::select! {
                    biased;
                    _ = self.stop.cancelled() => return Err(LoopExit::Stopped),
                    _ = self.cancel.cancelled() => return Err(LoopExit::Cancelled),
                    permit = self.gate.acquire() => permit,
                };

                tracing::debug!(id = %self.item.id, title = %self.item.title, "Boosting item");
                let outcome = permit.refresh(self.action.as_ref(), &self.item).await;
                match outcome {
                    Ok(()) => {
                        self.item.mark_refreshed(Utc::now());
                        tracing::info!(id = %self.item.id, title = %self.item.title, "Boosted item");
                        break;
                    }
                    Err(e) => {
                        if e.is_too_early() {
                            tracing::info!(
                                id = %self.item.id,
                                wait_for_secs = self.schedule.refresh_backoff.as_secs(),
                                "Item is not due yet on the remote side, will retry"
                            );
                        } else {
                            tracing::warn!(
                                id = %self.item.id,
                                error = %e,
                                wait_for_secs = self.schedule.refresh_backoff.as_secs(),
                                "Failed to boost item, will schedule another attempt"
                            );
                        }
                        self.sleep(self.schedule.refresh_backoff).await?;
                    }
                }
            }
        }
    }

    /// Sleep unless stopped or cancelled first.
    async fn sleep(&self, duration: Duration) -> std::result::Result<(), LoopExit> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.stop.cancelled() => Err(LoopExit::Stopped),
            _ = self.cancel.cancelled() => Err(LoopExit::Cancelled),
        }
    }
}
