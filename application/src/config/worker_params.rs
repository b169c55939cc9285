//! Worker parameters for the feedback consumer loop.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Feedback worker loop parameters.
///
/// `max_attempts` bounds redelivery: a message received more often than this
/// is dead-lettered instead of processed again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerParams {
    pub max_attempts: u32,
    pub batch_size: usize,
    /// How long one receive call waits for the first message
    pub wait: Duration,
    /// Cap for the exponential backoff after failed receives
    pub max_backoff: Duration,
}

impl Default for WorkerParams {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            batch_size: 10,
            wait: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl WorkerParams {
    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Backoff after `failures` consecutive failed receives: 1s, 2s, 4s, ...
    pub fn backoff_for(&self, failures: u32) -> Duration {
        let exp = failures.saturating_sub(1).min(16);
        Duration::from_secs(1u64 << exp).min(self.max_backoff)
    }
}
