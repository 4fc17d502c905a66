//! Boostable item discovered from the remote source

use chrono::{DateTime, Duration, Utc};

/// One boostable unit (a resume).
///
/// Created by an [`ItemSource`](crate::discovery::ItemSource) and owned by
/// exactly one refresh loop once scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stable identifier, unique across the source
    pub id: String,
    /// Display title, used for filtering and logs
    pub title: String,
    /// Public (true) or private (false)
    pub visible: bool,
    /// Last successful boost, or the source-reported update time
    pub last_refreshed_at: DateTime<Utc>,
    /// XSRF token captured at discovery and reused for boosting this item
    pub session_token: String,
}

impl Item {
    /// Create an item that was last refreshed at `last_refreshed_at`
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        visible: bool,
        last_refreshed_at: DateTime<Utc>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            visible,
            last_refreshed_at,
            session_token: session_token.into(),
        }
    }

    /// When the next boost is due
    pub fn next_due(&self, interval: Duration) -> DateTime<Utc> {
        self.last_refreshed_at
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Time left until the next boost; `None` if already due
    pub fn wait_for(&self, interval: Duration, now: DateTime<Utc>) -> Option<std::time::Duration> {
        (self.next_due(interval) - now).to_std().ok().filter(|d| !d.is_zero())
    }

    /// Record a successful boost
    pub fn mark_refreshed(&mut self, at: DateTime<Utc>) {
        self.last_refreshed_at = at;
    }
}
