//! Periodic item discovery.
//!
//! [`discover`] spawns a producer task that polls an [`ItemSource`], filters
//! the result through the eligibility policy and hands items to the consumer
//! one at a time over a bounded channel. The producer:
//! - re-polls every `discover_interval` (or stops after one pass when it is zero)
//! - waits `discover_backoff` after a failed poll
//! - gives up for good after [`MAX_CONSECUTIVE_FAILURES`] failures in a row
//!
//! The stream never yields an error; it just ends. Dropping the [`ItemStream`]
//! stops the producer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::BoostContext;
use crate::domain::Item;
use crate::eligibility::is_eligible;
use crate::error::Result;

/// Consecutive failed polls after which discovery stops permanently.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Something that can enumerate the current items.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// One discovery attempt. Must be safe to call repeatedly.
    async fn poll(&self) -> Result<Vec<Item>>;
}

/// Lazy, possibly infinite sequence of eligible items.
pub struct ItemStream {
    rx: mpsc::Receiver<Item>,
    producer: JoinHandle<()>,
}

impl ItemStream {
    /// Next eligible item, or `None` once discovery is permanently done.
    pub async fn next(&mut self) -> Option<Item> {
        self.rx.recv().await
    }
}

impl Drop for ItemStream {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

/// Start discovering items from `source`.
pub fn discover(ctx: &BoostContext, source: Arc<dyn ItemSource>) -> ItemStream {
    let (tx, rx) = mpsc::channel(1);
    let producer = tokio::spawn(run_discovery(ctx.clone(), source, tx));
    ItemStream { rx, producer }
}

async fn run_discovery(ctx: BoostContext, source: Arc<dyn ItemSource>, tx: mpsc::Sender<Item>) {
    let schedule = ctx.schedule;
    let mut consecutive_failures = 0u32;

    loop {
        tracing::debug!("Discovering items");

        let polled = tokio::select! {
            result = source.poll() => result,
            _ = ctx.cancel.cancelled() => return,
        };

        match polled {
            Err(e) => {
                tracing::error!(error = %e, "Failed to get item list");

                if schedule.is_one_shot() {
                    return;
                }

                consecutive_failures += 1;
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    tracing::error!(
                        failures = consecutive_failures,
                        "Too many consecutive discovery failures, stopping discovery"
                    );
                    return;
                }

                tracing::info!(
                    wait_for_secs = schedule.discover_backoff.as_secs(),
                    "Scheduled next discovery retry"
                );
                if !pause(schedule.discover_backoff, &ctx.cancel, &tx).await {
                    return;
                }
                continue;
            }
            Ok(items) => {
                consecutive_failures = 0;

                for item in items {
                    if !is_eligible(&item, &ctx.policy) {
                        tracing::warn!(
                            id = %item.id,
                            title = %item.title,
                            "Ignoring item due to eligibility constraints"
                        );
                        continue;
                    }

                    tracing::info!(id = %item.id, title = %item.title, "Discovered item");
                    let delivered = tokio::select! {
                        sent = tx.send(item) => sent.is_ok(),
                        _ = ctx.cancel.cancelled() => false,
                    };
                    if !delivered {
                        return;
                    }
                }
            }
        }

        if schedule.is_one_shot() {
            return;
        }

        tracing::info!(
            wait_for_secs = schedule.discover_interval.as_secs(),
            "Scheduled next discovery"
        );
        if !pause(schedule.discover_interval, &ctx.cancel, &tx).await {
            return;
        }
    }
}

/// Sleep for `duration`; false if cancelled or the consumer went away first.
async fn pause(duration: Duration, cancel: &CancellationToken, tx: &mpsc::Sender<Item>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
        _ = tx.closed() => false,
    }
}
