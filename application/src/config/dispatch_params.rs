//! Fan-out timing parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time each agent gets to answer
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(8);

/// Fan-out timing parameters.
///
/// Every agent is bounded by its own timeout (its descriptor override or
/// `agent_timeout`). The optional `deadline` bounds the whole dispatch; when
/// it fires, agents still running are abandoned and reported as timed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchParams {
    pub agent_timeout: Duration,
    pub deadline: Option<Duration>,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
            deadline: None,
        }
    }
}

impl DispatchParams {
    // ==================== Builder Methods ====================

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}
