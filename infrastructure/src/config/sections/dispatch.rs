//! Dispatch configuration from TOML (`[dispatch]` section)

use crate::agents::BUILTIN_AGENTS;
use crate::config::issue::{ConfigIssue, ConfigIssueCode};
use council_application::DispatchParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Raw dispatch configuration from TOML
///
/// # Example
///
/// ```toml
/// [dispatch]
/// agent_timeout_ms = 8000
/// deadline_ms = 10000                      # optional outer deadline
/// agents = ["style", "naming", "security"] # built-in agents to enable
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Default per-agent timeout
    pub agent_timeout_ms: u64,
    /// Outer deadline for the whole fan-out
    pub deadline_ms: Option<u64>,
    /// Enabled built-in agents, in dispatch (and tie-break) order
    pub agents: Vec<String>,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            agent_timeout_ms: 8_000,
            deadline_ms: None,
            agents: BUILTIN_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FileDispatchConfig {
    pub fn to_params(&self) -> DispatchParams {
        DispatchParams::default()
            .with_agent_timeout(Duration::from_millis(self.agent_timeout_ms))
            .with_deadline(self.deadline_ms.map(Duration::from_millis))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.agent_timeout_ms == 0 {
            issues.push(ConfigIssue::zero("dispatch.agent_timeout_ms"));
        }
        if self.deadline_ms == Some(0) {
            issues.push(ConfigIssue::zero("dispatch.deadline_ms"));
        }

        let mut seen = HashSet::new();
        for name in &self.agents {
            if !BUILTIN_AGENTS.contains(&name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownAgent { name: name.clone() },
                    format!(
                        "dispatch.agents: unknown agent '{}' (available: {})",
                        name,
                        BUILTIN_AGENTS.join(", ")
                    ),
                ));
            } else if !seen.insert(name.as_str()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicateAgent { id: name.clone() },
                    format!("dispatch.agents: '{}' listed more than once", name),
                ));
            }
        }

        issues
    }
}
