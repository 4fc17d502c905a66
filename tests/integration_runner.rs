//! Runner integration tests
//!
//! Drives discovery, scheduling and refresh end to end with mock
//! collaborators on a paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use boostr::context::{BoostContext, Schedule};
use boostr::discovery::ItemSource;
use boostr::domain::Item;
use boostr::eligibility::{AllowList, EligibilityPolicy};
use boostr::error::{BoostError, Result};
use boostr::runner::{RunOutcome, run};
use boostr::scheduler::RefreshAction;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Source returning a fixed list on every poll
struct StaticSource {
    items: Vec<Item>,
    polls: AtomicUsize,
}

impl StaticSource {
    fn new(items: Vec<Item>) -> Arc<Self> {
        Arc::new(Self {
            items,
            polls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ItemSource for StaticSource {
    async fn poll(&self) -> Result<Vec<Item>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }
}

struct FailingSource;

#[async_trait]
impl ItemSource for FailingSource {
    async fn poll(&self) -> Result<Vec<Item>> {
        Err(BoostError::Status(503))
    }
}

/// Action counting successful refreshes per item id
#[derive(Default)]
struct CountingAction {
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingAction {
    fn calls_for(&self, id: &str) -> usize {
        self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl RefreshAction for CountingAction {
    async fn refresh(&self, item: &Item) -> Result<()> {
        *self.calls.lock().unwrap().entry(item.id.clone()).or_default() += 1;
        Ok(())
    }
}

/// Action that is always rejected as too early
struct RejectingAction;

#[async_trait]
impl RefreshAction for RejectingAction {
    async fn refresh(&self, _item: &Item) -> Result<()> {
        Err(BoostError::TooEarly)
    }
}

fn stale_item(id: &str) -> Item {
    Item::new(id, format!("Resume {}", id), true, Utc::now() - chrono::Duration::days(1), "xsrf")
}

fn schedule(discover_interval: Duration) -> Schedule {
    Schedule {
        refresh_interval: Duration::from_secs(600),
        refresh_backoff: Duration::from_secs(30),
        discover_interval,
        discover_backoff: Duration::from_secs(30),
    }
}

fn cancel_after(cancel: &CancellationToken, after: Duration) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        cancel.cancel();
    });
}

#[tokio::test(start_paused = true)]
async fn test_empty_discovery_is_nothing_to_do() {
    let ctx = BoostContext::new(schedule(Duration::ZERO), EligibilityPolicy::default(), CancellationToken::new());
    let action = Arc::new(CountingAction::default());

    let summary = run(&ctx, StaticSource::new(Vec::new()), action).await;

    assert_eq!(summary.outcome, RunOutcome::NothingToDo);
    assert_eq!(summary.scheduled, 0);
    assert_eq!(summary.boosts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_broken_source_is_nothing_to_do() {
    let ctx = BoostContext::new(
        schedule(Duration::from_secs(600)),
        EligibilityPolicy::default(),
        CancellationToken::new(),
    );
    let action = Arc::new(CountingAction::default());

    let summary = run(&ctx, Arc::new(FailingSource), action).await;

    assert_eq!(summary.outcome, RunOutcome::NothingToDo);
    assert_eq!(summary.scheduled, 0);
}

#[tokio::test(start_paused = true)]
async fn test_runs_until_cancelled() {
    let cancel = CancellationToken::new();
    let ctx = BoostContext::new(schedule(Duration::ZERO), EligibilityPolicy::default(), cancel.clone());
    let source = StaticSource::new(vec![stale_item("a"), stale_item("b"), stale_item("a"), stale_item("c")]);
    let action = Arc::new(CountingAction::default());

    cancel_after(&cancel, Duration::from_secs(3600));
    let summary = run(&ctx, source.clone(), action.clone()).await;

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.scheduled, 3);
    assert_eq!(source.polls.load(Ordering::SeqCst), 1);

    // Each item is boosted right away, then about every ten minutes
    for id in ["a", "b", "c"] {
        assert!(action.calls_for(id) >= 3, "item {} boosted {} times", id, action.calls_for(id));
    }
    assert_eq!(summary.boosts as usize, ["a", "b", "c"].iter().map(|id| action.calls_for(id)).sum::<usize>());
}

#[tokio::test(start_paused = true)]
async fn test_rediscovered_items_are_not_rescheduled() {
    let cancel = CancellationToken::new();
    let ctx = BoostContext::new(
        schedule(Duration::from_secs(600)),
        EligibilityPolicy::default(),
        cancel.clone(),
    );
    let source = StaticSource::new(vec![stale_item("a"), stale_item("b")]);
    let action = Arc::new(CountingAction::default());

    cancel_after(&cancel, Duration::from_secs(3000));
    let summary = run(&ctx, source.clone(), action).await;

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert!(source.polls.load(Ordering::SeqCst) >= 2);
    assert_eq!(summary.scheduled, 2);
}

#[tokio::test(start_paused = true)]
async fn test_policy_limits_what_gets_boosted() {
    let cancel = CancellationToken::new();
    let policy = EligibilityPolicy {
        allowed: AllowList {
            substrings: vec!["resume b".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let ctx = BoostContext::new(schedule(Duration::ZERO), policy, cancel.clone());
    let source = StaticSource::new(vec![stale_item("a"), stale_item("b")]);
    let action = Arc::new(CountingAction::default());

    cancel_after(&cancel, Duration::from_secs(60));
    let summary = run(&ctx, source, action.clone()).await;

    assert_eq!(summary.scheduled, 1);
    assert_eq!(action.calls_for("a"), 0);
    assert_eq!(action.calls_for("b"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = BoostContext::new(schedule(Duration::ZERO), EligibilityPolicy::default(), cancel);
    let action = Arc::new(CountingAction::default());

    let summary = run(&ctx, StaticSource::new(vec![stale_item("a")]), action.clone()).await;

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(action.calls_for("a"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_summary_counts_failed_attempts() {
    let cancel = CancellationToken::new();
    let ctx = BoostContext::new(schedule(Duration::ZERO), EligibilityPolicy::default(), cancel.clone());

    // Attempts at 0s, 30s and 60s, cancelled during the next backoff
    cancel_after(&cancel, Duration::from_secs(75));
    let summary = run(&ctx, StaticSource::new(vec![stale_item("a")]), Arc::new(RejectingAction)).await;

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.boosts, 0);
    assert_eq!(summary.failures, 3);
}
