//! Input limits from TOML (`[limits]` section)

use crate::config::issue::ConfigIssue;
use council_domain::DEFAULT_MAX_CODE_BYTES;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLimitsConfig {
    /// Largest accepted code sample, in bytes
    pub max_code_bytes: usize,
}

impl Default for FileLimitsConfig {
    fn default() -> Self {
        Self {
            max_code_bytes: DEFAULT_MAX_CODE_BYTES,
        }
    }
}

impl FileLimitsConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.max_code_bytes == 0 {
            vec![ConfigIssue::zero("limits.max_code_bytes")]
        } else {
            vec![]
        }
    }
}
