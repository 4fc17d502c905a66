//! Shared context handed to every scheduling component.
//!
//! Carries the cadence settings, the eligibility policy and the process-wide
//! cancellation token; nothing in the core reads global state.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, ScheduleConfig};
use crate::eligibility::EligibilityPolicy;

/// Boost and discovery timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Interval between boosts of one item
    pub refresh_interval: Duration,
    /// Wait before retrying a failed boost
    pub refresh_backoff: Duration,
    /// Interval between discoveries; zero means discover once
    pub discover_interval: Duration,
    /// Wait before retrying a failed discovery
    pub discover_backoff: Duration,
}

impl Schedule {
    /// Whether discovery runs only once
    pub fn is_one_shot(&self) -> bool {
        self.discover_interval.is_zero()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from(&ScheduleConfig::default())
    }
}

impl From<&ScheduleConfig> for Schedule {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            refresh_backoff: config.refresh_backoff(),
            discover_interval: config.discover_interval(),
            discover_backoff: config.discover_backoff(),
        }
    }
}

/// Context passed to the discovery loop, the scheduler and the runner.
#[derive(Debug, Clone)]
pub struct BoostContext {
    pub schedule: Schedule,
    pub policy: Arc<EligibilityPolicy>,
    /// Fires on external shutdown (Ctrl-C, SIGTERM)
    pub cancel: CancellationToken,
}

impl BoostContext {
    pub fn new(schedule: Schedule, policy: EligibilityPolicy, cancel: CancellationToken) -> Self {
        Self {
            schedule,
            policy: Arc::new(policy),
            cancel,
        }
    }

    /// Build a context from a validated configuration.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Self {
        Self::new(Schedule::from(&config.schedule), config.eligibility.clone(), cancel)
    }
}
