//! Global configuration.
//!
//! Loaded from an explicit path, ./.boostr.yml or ~/.config/boostr/boostr.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::eligibility::EligibilityPolicy;

/// Lowest accepted boost interval.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 10 * 60;
/// Lowest accepted boost backoff.
pub const MIN_REFRESH_BACKOFF_SECS: u64 = 30;
/// Lowest accepted non-zero discovery interval.
pub const MIN_DISCOVER_INTERVAL_SECS: u64 = 10 * 60;
/// Lowest accepted discovery backoff.
pub const MIN_DISCOVER_BACKOFF_SECS: u64 = 30;

/// Global configuration for Boostr.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Log level (error, warn, info, debug, trace).
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Append logs to this file instead of stderr.
    #[serde(rename = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Debug output (overrides log-level).
    pub debug: bool,

    /// Log every HTTP exchange.
    #[serde(rename = "http-debug")]
    pub http_debug: bool,

    /// HeadHunter account and endpoint.
    pub account: AccountConfig,

    /// Boost and discovery cadence.
    pub schedule: ScheduleConfig,

    /// Which resumes get boosted.
    pub eligibility: EligibilityPolicy,

    /// File this configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,

    /// Config files found on the search path but rejected, with the reason.
    #[serde(skip)]
    pub skipped: Vec<(PathBuf, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            log_file: None,
            debug: false,
            http_debug: false,
            account: AccountConfig::default(),
            schedule: ScheduleConfig::default(),
            eligibility: EligibilityPolicy::default(),
            source: None,
            skipped: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .boostr.yml in current directory
    /// 3. ~/.config/boostr/boostr.yml
    /// 4. Defaults
    ///
    /// Runs before logging is set up, so nothing is logged here: the chosen
    /// file ends up in `source` and rejected ones in `skipped`.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates = vec![PathBuf::from(".boostr.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("boostr").join("boostr.yml"));
        }

        let mut skipped = Vec::new();
        for candidate in candidates.into_iter().filter(|path| path.exists()) {
            match Self::load_from_file(&candidate) {
                Ok(mut config) => {
                    config.skipped = skipped;
                    return Ok(config);
                }
                Err(e) => skipped.push((candidate, format!("{:#}", e))),
            }
        }

        Ok(Self {
            skipped,
            ..Self::default()
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let mut config = Self::from_yaml(&content)?;
        config.source = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    /// Parse YAML and normalize the eligibility lists.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content).context("Failed to parse config file")?;
        config.eligibility = config.eligibility.normalized();
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded file.
    pub fn apply_overrides(&mut self, login: Option<&str>, password: Option<&str>, debug: bool) {
        if let Some(login) = login {
            self.account.login = login.to_string();
        }
        if let Some(password) = password {
            self.account.password = password.to_string();
        }
        if debug {
            self.debug = true;
        }
    }

    /// Effective log level.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or("info")
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.account.endpoint.trim();
        if endpoint.is_empty() {
            eyre::bail!("missing HeadHunter endpoint");
        }
        let url = reqwest::Url::parse(endpoint).context("parsing HeadHunter endpoint URL")?;
        if url.scheme() != "http" && url.scheme() != "https" {
            eyre::bail!(
                "invalid HeadHunter endpoint URL scheme: \"{}\" (must be either \"http\" or \"https\")",
                url.scheme()
            );
        }
        if self.account.login.is_empty() {
            eyre::bail!("missing HeadHunter login");
        }
        if self.account.password.is_empty() {
            eyre::bail!("missing HeadHunter password");
        }
        if self.account.chrome_version == 0 {
            eyre::bail!("invalid Chrome version");
        }

        let policy = &self.eligibility;
        if policy.ignored.public && policy.ignored.private {
            eyre::bail!("invalid ignore list state: both private and public resumes will be ignored");
        }
        if !policy.allowed.is_empty() && !policy.ignored.is_empty() {
            eyre::bail!("resume ignore list will not be enforced if some resumes are explicitly allowed");
        }

        let schedule = &self.schedule;
        if schedule.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS {
            eyre::bail!("schedule.refresh-interval-secs is too low (minimum {})", MIN_REFRESH_INTERVAL_SECS);
        }
        if schedule.refresh_backoff_secs < MIN_REFRESH_BACKOFF_SECS {
            eyre::bail!("schedule.refresh-backoff-secs is too low (minimum {})", MIN_REFRESH_BACKOFF_SECS);
        }
        if schedule.discover_interval_secs != 0 && schedule.discover_interval_secs < MIN_DISCOVER_INTERVAL_SECS {
            eyre::bail!(
                "schedule.discover-interval-secs is too low (0 or at least {})",
                MIN_DISCOVER_INTERVAL_SECS
            );
        }
        if schedule.discover_backoff_secs < MIN_DISCOVER_BACKOFF_SECS {
            eyre::bail!("schedule.discover-backoff-secs is too low (minimum {})", MIN_DISCOVER_BACKOFF_SECS);
        }
        Ok(())
    }
}

/// HeadHunter account and endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Base URL of the HeadHunter frontend.
    pub endpoint: String,

    /// Email, phone or login.
    pub login: String,

    /// Account password.
    pub password: String,

    /// Major version of the impersonated Chrome browser.
    #[serde(rename = "chrome-version")]
    pub chrome_version: u32,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::config::DEFAULT_ENDPOINT.to_string(),
            login: String::new(),
            password: String::new(),
            chrome_version: crate::config::DEFAULT_CHROME_VERSION,
        }
    }
}

/// Boost and discovery cadence, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Interval between consecutive boosts of one resume.
    #[serde(rename = "refresh-interval-secs")]
    pub refresh_interval_secs: u64,

    /// Wait before retrying a failed boost.
    #[serde(rename = "refresh-backoff-secs")]
    pub refresh_backoff_secs: u64,

    /// Interval between resume list refreshes (0 = discover once).
    #[serde(rename = "discover-interval-secs")]
    pub discover_interval_secs: u64,

    /// Wait before retrying a failed discovery.
    #[serde(rename = "discover-backoff-secs")]
    pub discover_backoff_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 4 * 3600 + 2 * 60, // HH allows one boost per 4 hours
            refresh_backoff_secs: 90,
            discover_interval_secs: 150 * 60,
            discover_backoff_secs: 5 * 60,
        }
    }
}

impl ScheduleConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn refresh_backoff(&self) -> Duration {
        Duration::from_secs(self.refresh_backoff_secs)
    }

    pub fn discover_interval(&self) -> Duration {
        Duration::from_secs(self.discover_interval_secs)
    }

    pub fn discover_backoff(&self) -> Duration {
        Duration::from_secs(self.discover_backoff_secs)
    }
}
