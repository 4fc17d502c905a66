//! Configuration system for Boostr.
//!
//! A single YAML file holds the account, the boost/discovery cadence and the
//! eligibility lists. Command-line flags override a few account fields.

pub use self::global::{
    AccountConfig, Config, MIN_DISCOVER_BACKOFF_SECS, MIN_DISCOVER_INTERVAL_SECS, MIN_REFRESH_BACKOFF_SECS,
    MIN_REFRESH_INTERVAL_SECS, ScheduleConfig,
};

mod global;

/// Default HeadHunter endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://hh.ru";

/// Default impersonated Chrome major version.
pub const DEFAULT_CHROME_VERSION: u32 = 135;
