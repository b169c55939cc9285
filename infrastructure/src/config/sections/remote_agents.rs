//! Remote agent definitions from TOML (`[[remote_agents]]` array)

use crate::config::issue::{ConfigIssue, ConfigIssueCode};
use council_domain::{AgentDescriptor, AgentId, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One HTTP advisory engine
///
/// ```toml
/// [[remote_agents]]
/// id = "perf"
/// url = "http://localhost:9000/analyze"
/// max_severity = 4
/// timeout_ms = 3000       # optional, overrides dispatch.agent_timeout_ms
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRemoteAgentConfig {
    pub id: String,
    pub url: String,
    #[serde(default = "default_max_severity")]
    pub max_severity: u8,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_max_severity() -> u8 {
    Severity::MAX.value()
}

impl FileRemoteAgentConfig {
    pub fn descriptor(&self) -> AgentDescriptor {
        let descriptor =
            AgentDescriptor::new(self.id.as_str()).with_max_severity(self.max_severity);
        match self.timeout_ms {
            Some(ms) => descriptor.with_timeout(Duration::from_millis(ms)),
            None => descriptor,
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !AgentId::new(self.id.as_str()).is_valid() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidAgentId {
                    id: self.id.clone(),
                },
                format!("remote_agents: invalid agent id '{}'", self.id),
            ));
        }
        if self.url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingUrl {
                    agent: self.id.clone(),
                },
                format!("remote_agents.{}: url is required", self.id),
            ));
        }
        if !(Severity::MIN.value()..=Severity::MAX.value()).contains(&self.max_severity) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::SeverityOutOfRange {
                    agent: self.id.clone(),
                    value: self.max_severity,
                },
                format!(
                    "remote_agents.{}: max_severity {} is outside 1..=5",
                    self.id, self.max_severity
                ),
            ));
        }
        if self.timeout_ms == Some(0) {
            issues.push(ConfigIssue::zero(&format!(
                "remote_agents.{}.timeout_ms",
                self.id
            )));
        }

        issues
    }
}
