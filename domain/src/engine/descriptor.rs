//! Agent descriptor value object

use crate::core::agent_id::AgentId;
use crate::finding::Severity;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What an advisory engine declares about itself
///
/// # Example
///
/// ```
/// use council_domain::{AgentDescriptor, Severity};
/// use std::time::Duration;
///
/// let docs = AgentDescriptor::new("docstring")
///     .with_max_severity(3)
///     .with_timeout(Duration::from_secs(2));
///
/// assert_eq!(docs.max_severity, Severity::WARNING);
/// assert_eq!(docs.timeout, Some(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    /// Highest severity this agent may report; anything above is capped
    pub max_severity: Severity,
    /// Per-agent timeout override; `None` uses the dispatcher default
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl AgentDescriptor {
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            max_severity: Severity::MAX,
            timeout: None,
        }
    }

    pub fn with_max_severity(mut self, max_severity: u8) -> Self {
        self.max_severity = Severity::new(max_severity);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Timeout to enforce for this agent
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}
