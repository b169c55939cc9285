//! Feedback queue configuration from TOML (`[queue]` section)

use super::weights::{data_path, expand_home};
use crate::config::issue::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// ```toml
/// [queue]
/// path = "~/.local/share/codecouncil/feedback.sqlite"
/// visibility_timeout_ms = 30000
/// enqueue_timeout_ms = 2000
/// poll_interval_ms = 200
/// ```
///
/// `feedback` appends to this database and `worker` drains it, so both
/// commands must resolve the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQueueConfig {
    /// How long a received message stays invisible before redelivery
    pub visibility_timeout_ms: u64,
    /// Upper bound on one enqueue from the feedback endpoint
    pub enqueue_timeout_ms: u64,
    /// Pause between empty polls of the database
    pub poll_interval_ms: u64,
    /// SQLite database; `feedback.sqlite` under the data directory when unset
    pub path: Option<PathBuf>,
}

impl Default for FileQueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_ms: 30_000,
            enqueue_timeout_ms: 2_000,
            poll_interval_ms: 200,
            path: None,
        }
    }
}

impl FileQueueConfig {
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.visibility_timeout_ms)
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Database file, `None` without a data directory
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(p) => Some(expand_home(p)),
            None => data_path("feedback.sqlite"),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.visibility_timeout_ms == 0 {
            issues.push(ConfigIssue::zero("queue.visibility_timeout_ms"));
        }
        if self.enqueue_timeout_ms == 0 {
            issues.push(ConfigIssue::zero("queue.enqueue_timeout_ms"));
        }
        if self.poll_interval_ms == 0 {
            issues.push(ConfigIssue::zero("queue.poll_interval_ms"));
        }
        issues
    }
}
