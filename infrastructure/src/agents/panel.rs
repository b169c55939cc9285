//! Assemble the agent registry from configuration

use super::RuleAgent;
use crate::config::FileConfig;
use council_application::AgentRegistry;
use council_domain::DomainError;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Unknown built-in agent: {0}")]
    UnknownAgent(String),

    #[error("Cannot register agent: {0}")]
    Registration(#[from] DomainError),

    #[error("Remote agent '{id}' could not be created: {reason}")]
    Remote { id: String, reason: String },
}

/// Registry holding the configured built-ins followed by remote agents
pub fn build_registry(config: &FileConfig) -> Result<AgentRegistry, PanelError> {
    let mut registry = AgentRegistry::new();

    for name in &config.dispatch.agents {
        let agent =
            RuleAgent::builtin(name).ok_or_else(|| PanelError::UnknownAgent(name.clone()))?;
        registry = registry.register(agent)?;
    }

    for remote in &config.remote_agents {
        registry = register_remote(registry, remote)?;
    }

    debug!("Agent panel: {} agents registered", registry.len());
    Ok(registry)
}

#[cfg(feature = "remote-agents")]
fn register_remote(
    registry: AgentRegistry,
    remote: &crate::config::FileRemoteAgentConfig,
) -> Result<AgentRegistry, PanelError> {
    let agent = super::RemoteAgent::new(remote.descriptor(), remote.url.as_str()).map_err(|e| {
        PanelError::Remote {
            id: remote.id.clone(),
            reason: e.to_string(),
        }
    })?;
    Ok(registry.register(agent)?)
}

#[cfg(not(feature = "remote-agents"))]
fn register_remote(
    registry: AgentRegistry,
    remote: &crate::config::FileRemoteAgentConfig,
) -> Result<AgentRegistry, PanelError> {
    tracing::warn!(
        "Skipping remote agent '{}': built without the remote-agents feature",
        remote.id
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileRemoteAgentConfig;

    #[test]
    fn test_default_panel_is_all_builtins() {
        let registry = build_registry(&FileConfig::default()).unwrap();
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, super::super::BUILTIN_AGENTS);
    }

    #[test]
    fn test_subset_keeps_configured_order() {
        let mut config = FileConfig::default();
        config.dispatch.agents = vec!["security".to_string(), "style".to_string()];

        let registry = build_registry(&config).unwrap();
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["security", "style"]);
    }

    #[test]
    fn test_unknown_builtin_fails() {
        let mut config = FileConfig::default();
        config.dispatch.agents = vec!["oracle".to_string()];

        assert!(matches!(
            build_registry(&config),
            Err(PanelError::UnknownAgent(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_duplicate_builtin_fails() {
        let mut config = FileConfig::default();
        config.dispatch.agents = vec!["style".to_string(), "style".to_string()];

        assert!(matches!(
            build_registry(&config),
            Err(PanelError::Registration(_))
        ));
    }

    #[test]
    fn test_remote_agents_follow_builtins() {
        let mut config = FileConfig::default();
        config.dispatch.agents = vec!["style".to_string()];
        config.remote_agents.push(FileRemoteAgentConfig {
            id: "perf".to_string(),
            url: "http://127.0.0.1:9/evaluate".to_string(),
            max_severity: 4,
            timeout_ms: None,
        });

        let registry = build_registry(&config).unwrap();
        let expected = if cfg!(feature = "remote-agents") { 2 } else { 1 };
        assert_eq!(registry.len(), expected);
    }
}
