//! Agent identifier value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted agent identifier.
pub const MAX_AGENT_ID_LEN: usize = 64;

/// Identifier of an advisory engine (Value Object)
///
/// Agent ids are free-form but restricted to ASCII alphanumerics, `-`, `_`
/// and `.` so they can be used as storage keys and log fields unescaped.
///
/// # Example
///
/// ```
/// use council_domain::AgentId;
///
/// let id = AgentId::new("security");
/// assert!(id.is_valid());
/// assert!(!AgentId::new("").is_valid());
/// assert!(!AgentId::new("has space").is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Check the identifier against the storage key rules
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= MAX_AGENT_ID_LEN
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId::new(s)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
