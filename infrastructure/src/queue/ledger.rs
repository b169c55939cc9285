//! In-memory applied-feedback ledger
//!
//! Applied keys are forgotten after a retention window, so a long-running
//! worker holds at most one window's worth of keys. Redeliveries arrive
//! within a few visibility timeouts, far inside any sensible window.

use async_trait::async_trait;
use council_application::{FeedbackLedger, LedgerError};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// How long an applied key is remembered
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// How long a claim blocks other workers before it is presumed abandoned
pub const DEFAULT_CLAIM_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Claimed,
    Applied,
}

#[derive(Default)]
struct Keys {
    states: HashMap<String, (KeyState, Instant)>,
    /// Applied keys in commit order, for pruning from the front
    applied_order: VecDeque<(Instant, String)>,
}

impl Keys {
    fn prune(&mut self, now: Instant, retention: Duration) {
        while let Some((at, _)) = self.applied_order.front() {
            if now.saturating_duration_since(*at) < retention {
                break;
            }
            let Some((at, key)) = self.applied_order.pop_front() else {
                break;
            };
            if self.states.get(&key) == Some(&(KeyState::Applied, at)) {
                self.states.remove(&key);
            }
        }
    }
}

pub struct InMemoryFeedbackLedger {
    keys: Mutex<Keys>,
    retention: Duration,
    claim_timeout: Duration,
}

impl Default for InMemoryFeedbackLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFeedbackLedger {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(Keys::default()),
            retention: DEFAULT_RETENTION,
            claim_timeout: DEFAULT_CLAIM_TIMEOUT,
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_claim_timeout(mut self, timeout: Duration) -> Self {
        self.claim_timeout = timeout;
        self
    }

    /// Keys currently remembered, claimed or applied
    pub async fn len(&self) -> usize {
        self.keys.lock().await.states.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl FeedbackLedger for InMemoryFeedbackLedger {
    async fn claim(&self, key: &str) -> Result<bool, LedgerError> {
        let mut keys = self.keys.lock().await;
        let now = Instant::now();
        keys.prune(now, self.retention);

        match keys.states.get(key) {
            Some((KeyState::Applied, _)) => return Ok(false),
            Some((KeyState::Claimed, at))
                if now.saturating_duration_since(*at) < self.claim_timeout =>
            {
                return Ok(false);
            }
            Some((KeyState::Claimed, _)) => {
                debug!(key, "Taking over abandoned claim");
            }
            None => {}
        }
        keys.states.insert(key.to_string(), (KeyState::Claimed, now));
        Ok(true)
    }

    async fn commit(&self, key: &str) -> Result<(), LedgerError> {
        let mut keys = self.keys.lock().await;
        let now = Instant::now();
        keys.states.insert(key.to_string(), (KeyState::Applied, now));
        keys.applied_order.push_back((now, key.to_string()));
        Ok(())
    }

    async fn release(&self, key: &str) -> Result<(), LedgerError> {
        let mut keys = self.keys.lock().await;
        if matches!(keys.states.get(key), Some((KeyState::Claimed, _))) {
            keys.states.remove(key);
        }
        Ok(())
    }
}
