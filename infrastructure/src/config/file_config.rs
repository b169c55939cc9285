//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application parameter
//! types; nothing outside this module sees TOML.

use super::issue::{ConfigIssue, ConfigIssueCode};
use super::sections::{
    FileCacheConfig, FileDispatchConfig, FileLimitsConfig, FileLoggingConfig, FileQueueConfig,
    FileRemoteAgentConfig, FileWeightsConfig, FileWorkerConfig,
};
use council_application::{AnalysisParams, WorkerParams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Fan-out timing and enabled built-in agents
    pub dispatch: FileDispatchConfig,
    /// Result cache lifetime
    pub cache: FileCacheConfig,
    /// Weight persistence
    pub weights: FileWeightsConfig,
    /// Feedback queue timing
    pub queue: FileQueueConfig,
    /// Feedback worker loop
    pub worker: FileWorkerConfig,
    /// Input limits
    pub limits: FileLimitsConfig,
    /// Log file and audit trail locations
    pub logging: FileLoggingConfig,
    /// HTTP advisory engines, dispatched after the built-ins
    pub remote_agents: Vec<FileRemoteAgentConfig>,
}

impl FileConfig {
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams::default()
            .with_max_code_bytes(self.limits.max_code_bytes)
            .with_cache_ttl(self.cache.ttl())
            .with_dispatch(self.dispatch.to_params())
    }

    pub fn worker_params(&self) -> WorkerParams {
        self.worker.to_params()
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.dispatch.validate());
        issues.extend(self.cache.validate());
        issues.extend(self.queue.validate());
        issues.extend(self.worker.validate());
        issues.extend(self.limits.validate());

        // Remote ids share one namespace with the enabled built-ins
        let mut seen: HashSet<&str> = self.dispatch.agents.iter().map(String::as_str).collect();
        for remote in &self.remote_agents {
            issues.extend(remote.validate());
            if !seen.insert(remote.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgent {
                        id: remote.id.clone(),
                    },
                    format!("remote_agents: agent id '{}' is already in use", remote.id),
                ));
            }
        }

        issues
    }
}
