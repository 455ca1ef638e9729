//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults;

/// Main gateway configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Persisted state locations and retention
    #[serde(default)]
    pub spool: SpoolConfig,
    /// Origin service settings
    #[serde(default)]
    pub source: SourceConfig,
    /// Generated article settings
    #[serde(default)]
    pub articles: ArticleConfig,
    /// Aggregate statistics reporting
    #[serde(default)]
    pub stats: StatsConfig,
    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Persisted state configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpoolConfig {
    /// Content index file
    #[serde(default = "defaults::spool_path")]
    pub spool_path: PathBuf,
    /// Per-group article number file
    #[serde(default = "defaults::newsrc_path")]
    pub newsrc_path: PathBuf,
    /// Content older than this many days is expunged
    #[serde(default = "defaults::max_age_days")]
    pub max_age_days: u32,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            spool_path: defaults::spool_path(),
            newsrc_path: defaults::newsrc_path(),
            max_age_days: defaults::max_age_days(),
        }
    }
}

impl SpoolConfig {
    /// Retention window in seconds
    #[must_use]
    pub fn max_age_secs(&self) -> i64 {
        i64::from(self.max_age_days) * 86_400
    }
}

/// Origin service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Base URL, e.g. `https://www.reddit.com`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
    /// Abort origin requests after this many seconds (no limit when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            request_timeout_secs: None,
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Generated article configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleConfig {
    /// Right-hand side of generated message-ids
    #[serde(default = "defaults::message_id_domain")]
    pub message_id_domain: String,
    /// Path header value
    #[serde(default = "defaults::path_header")]
    pub path: String,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            message_id_domain: defaults::message_id_domain(),
            path: defaults::path_header(),
        }
    }
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsConfig {
    /// Seconds between aggregate reports (0 disables reporting)
    #[serde(default = "defaults::report_interval_secs")]
    pub interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::report_interval_secs(),
        }
    }
}
