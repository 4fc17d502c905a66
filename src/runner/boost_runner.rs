//! Boost runner - the blocking entry point of the scheduling core.
//!
//! Drives discovery into the scheduler, then waits until either nothing was
//! ever scheduled or the process is cancelled. All refresh loops are torn
//! down and joined before returning.

use std::sync::Arc;

use crate::context::BoostContext;
use crate::discovery::{ItemSource, discover};
use crate::scheduler::{BoostScheduler, RefreshAction};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Discovery finished without ever scheduling an item
    NothingToDo,
    /// External cancellation fired
    Cancelled,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Distinct items scheduled during the run
    pub scheduled: usize,
    /// Successful boosts across all items
    pub boosts: u64,
    /// Failed boost attempts across all items
    pub failures: u64,
}

/// Discover items from `source` and keep boosting them with `action`.
pub async fn run(ctx: &BoostContext, source: Arc<dyn ItemSource>, action: Arc<dyn RefreshAction>) -> RunSummary {
    let scheduler = BoostScheduler::new(ctx, action);
    let mut items = discover(ctx, source);

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            item = items.next() => item,
        };
        match next {
            Some(item) => {
                scheduler.schedule(item);
            }
            None => break,
        }
    }
    drop(items);

    tracing::debug!(scheduled = scheduler.known_count(), "Discovery finished");

    let done = scheduler.done();
    let outcome = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => {
            tracing::debug!("Shutting down due to cancellation");
            RunOutcome::Cancelled
        }
        _ = done.cancelled() => RunOutcome::NothingToDo,
    };

    scheduler.teardown();
    scheduler.join().await;

    let stats = scheduler.stats();
    RunSummary {
        outcome,
        scheduled: scheduler.known_count(),
        boosts: stats.total_refreshes,
        failures: stats.total_failures,
    }
}
