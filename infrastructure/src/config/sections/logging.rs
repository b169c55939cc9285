//! Logging configuration from TOML (`[logging]` section)

use super::weights::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [logging]
/// directory = "~/.local/state/codecouncil/logs"   # daily-rolling diagnostic log
/// audit_log = "~/.local/state/codecouncil/weights.jsonl"
/// audit_fsync = true   # sync each audit line before the feedback is acknowledged
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the rolling `tracing` log file; stderr only when unset
    pub directory: Option<PathBuf>,
    /// JSONL file recording every weight change
    pub audit_log: Option<PathBuf>,
    pub audit_fsync: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            audit_log: None,
            audit_fsync: true,
        }
    }
}

impl FileLoggingConfig {
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        self.directory.as_deref().map(expand_home)
    }

    pub fn resolved_audit_log(&self) -> Option<PathBuf> {
        self.audit_log.as_deref().map(expand_home)
    }
}
