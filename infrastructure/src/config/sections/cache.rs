//! Result cache configuration from TOML (`[cache]` section)

use super::weights::{data_path, expand_home};
use crate::config::issue::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// ```toml
/// [cache]
/// enabled = true
/// ttl_secs = 604800
/// path = "~/.cache/codecouncil"   # one JSON file per analysed fingerprint
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    /// Entry lifetime; one week by default
    pub ttl_secs: u64,
    /// Entry directory; `cache` under the data directory when unset
    pub path: Option<PathBuf>,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 7 * 24 * 60 * 60,
            path: None,
        }
    }
}

impl FileCacheConfig {
    /// Effective TTL; zero disables caching
    pub fn ttl(&self) -> Duration {
        if self.enabled {
            Duration::from_secs(self.ttl_secs)
        } else {
            Duration::ZERO
        }
    }

    /// Directory for cache entries, `None` without a data directory
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(p) => Some(expand_home(p)),
            None => data_path("cache"),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.enabled && self.ttl_secs == 0 {
            vec![ConfigIssue::zero("cache.ttl_secs")]
        } else {
            vec![]
        }
    }
}
