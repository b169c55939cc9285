//! Feedback worker configuration from TOML (`[worker]` section)

use crate::config::issue::{ConfigIssue, ConfigIssueCode};
use council_application::WorkerParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw worker configuration from TOML
///
/// ```toml
/// [worker]
/// max_attempts = 5        # deliveries before a message is dead-lettered
/// batch_size = 10
/// wait_ms = 1000          # long-poll wait per receive
/// max_backoff_secs = 60
/// dedup_retention_secs = 604800  # how long applied feedback is remembered
/// claim_timeout_secs = 300       # before a crashed worker's claim is taken over
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkerConfig {
    pub max_attempts: u32,
    pub batch_size: usize,
    pub wait_ms: u64,
    pub max_backoff_secs: u64,
    pub dedup_retention_secs: u64,
    pub claim_timeout_secs: u64,
}

impl Default for FileWorkerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            batch_size: 10,
            wait_ms: 1_000,
            max_backoff_secs: 60,
            dedup_retention_secs: 7 * 24 * 60 * 60,
            claim_timeout_secs: 5 * 60,
        }
    }
}

impl FileWorkerConfig {
    pub fn to_params(&self) -> WorkerParams {
        WorkerParams::default()
            .with_max_attempts(self.max_attempts)
            .with_batch_size(self.batch_size)
            .with_wait(Duration::from_millis(self.wait_ms))
            .with_max_backoff(Duration::from_secs(self.max_backoff_secs))
    }

    pub fn dedup_retention(&self) -> Duration {
        Duration::from_secs(self.dedup_retention_secs)
    }

    pub fn claim_timeout(&self) -> Duration {
        Duration::from_secs(self.claim_timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_attempts == 0 {
            issues.push(ConfigIssue::zero("worker.max_attempts"));
        }
        if self.batch_size == 0 {
            issues.push(ConfigIssue::zero("worker.batch_size"));
        }
        if self.max_backoff_secs == 0 {
            issues.push(ConfigIssue::zero("worker.max_backoff_secs"));
        }
        if self.claim_timeout_secs == 0 {
            issues.push(ConfigIssue::zero("worker.claim_timeout_secs"));
        }
        if self.dedup_retention_secs < self.claim_timeout_secs {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::RetentionTooShort,
                format!(
                    "worker.dedup_retention_secs ({}) is below worker.claim_timeout_secs ({}); redelivered feedback may be applied twice",
                    self.dedup_retention_secs, self.claim_timeout_secs
                ),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_params() {
        let params = FileWorkerConfig {
            max_attempts: 2,
            wait_ms: 250,
            ..Default::default()
        }
        .to_params();

        assert_eq!(params.max_attempts, 2);
        assert_eq!(params.batch_size, 10);
        assert_eq!(params.wait, Duration::from_millis(250));
        assert_eq!(params.max_backoff, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = FileWorkerConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_short_retention_is_a_warning() {
        let config = FileWorkerConfig {
            dedup_retention_secs: 10,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert_eq!(issues[0].code, ConfigIssueCode::RetentionTooShort);
        assert_eq!(config.dedup_retention(), Duration::from_secs(10));
    }
}
