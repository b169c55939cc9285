//! Agent registry
//!
//! The [`AgentRegistry`] holds the advisory engines taking part in every
//! analysis. Registration order matters: it is the merger's tie-break order,
//! so it is preserved exactly.
//!
//! # Usage
//!
//! ```ignore
//! let registry = AgentRegistry::new()
//!     .register(StyleAgent::new())?
//!     .register(SecurityAgent::new())?;
//!
//! assert_eq!(registry.len(), 2);
//! ```

use crate::ports::advisory_engine::AdvisoryEngine;
use council_domain::{AgentDescriptor, AgentId, DomainError};
use std::sync::Arc;

/// Ordered set of advisory engines with unique ids
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn AdvisoryEngine>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine
    pub fn register<E: AdvisoryEngine + 'static>(self, engine: E) -> Result<Self, DomainError> {
        self.register_arc(Arc::new(engine))
    }

    /// Register an engine (Arc version)
    ///
    /// Fails on an invalid id or an id that is already registered.
    pub fn register_arc(mut self, engine: Arc<dyn AdvisoryEngine>) -> Result<Self, DomainError> {
        let id = &engine.descriptor().id;
        if !id.is_valid() {
            return Err(DomainError::InvalidAgentId(id.to_string()));
        }
        if self.contains(id) {
            return Err(DomainError::DuplicateAgent(id.to_string()));
        }
        self.agents.push(engine);
        Ok(self)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.iter().any(|a| &a.descriptor().id == id)
    }

    /// Engines in registration order
    pub fn agents(&self) -> &[Arc<dyn AdvisoryEngine>] {
        &self.agents
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.iter().map(|a| a.descriptor())
    }

    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.descriptors().map(|d| &d.id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
