//! Built-in rule agents
//!
//! Five cheap, local advisory engines driven by regexes and line
//! heuristics. They need no network and answer in microseconds, which makes
//! them the default panel and a baseline next to remote engines. None of
//! them parses code; false positives are expected and are what feedback
//! training is for.

mod docstring;
mod minimalism;
mod naming;
mod panel;
mod security;
mod style;

#[cfg(feature = "remote-agents")]
mod remote;

pub use panel::{PanelError, build_registry};
#[cfg(feature = "remote-agents")]
pub use remote::RemoteAgent;

use async_trait::async_trait;
use council_application::{AdvisoryEngine, EngineError};
use council_domain::{AgentDescriptor, CodeSample, Finding, Location};

/// Names of the built-in agents, in default dispatch order
pub const BUILTIN_AGENTS: &[&str] = &["style", "naming", "minimalism", "docstring", "security"];

type CheckFn = fn(&CodeSample) -> Vec<Finding>;

/// An advisory engine backed by a pure check function
pub struct RuleAgent {
    descriptor: AgentDescriptor,
    check: CheckFn,
}

impl RuleAgent {
    fn new(id: &str, max_severity: u8, check: CheckFn) -> Self {
        Self {
            descriptor: AgentDescriptor::new(id).with_max_severity(max_severity),
            check,
        }
    }

    /// Look up a built-in agent by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            style::ID => Some(Self::new(style::ID, style::MAX_SEVERITY, style::check)),
            naming::ID => Some(Self::new(naming::ID, naming::MAX_SEVERITY, naming::check)),
            minimalism::ID => Some(Self::new(
                minimalism::ID,
                minimalism::MAX_SEVERITY,
                minimalism::check,
            )),
            docstring::ID => Some(Self::new(
                docstring::ID,
                docstring::MAX_SEVERITY,
                docstring::check,
            )),
            security::ID => Some(Self::new(
                security::ID,
                security::MAX_SEVERITY,
                security::check,
            )),
            _ => None,
        }
    }

    /// Every built-in agent, in default order
    pub fn all() -> Vec<Self> {
        BUILTIN_AGENTS
            .iter()
            .filter_map(|name| Self::builtin(name))
            .collect()
    }
}

#[async_trait]
impl AdvisoryEngine for RuleAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn evaluate(&self, sample: &CodeSample) -> Result<Vec<Finding>, EngineError> {
        Ok((self.check)(sample))
    }
}

/// Finding at a 1-based line
pub(crate) fn finding_at(
    agent: &str,
    kind: &str,
    message: impl Into<String>,
    severity: u8,
    confidence: f64,
    line: usize,
) -> Finding {
    Finding::new(agent, kind, message, severity, confidence)
        .with_location(Location::line(u32::try_from(line).unwrap_or(u32::MAX)))
}

/// Lines paired with their 1-based numbers
pub(crate) fn numbered_lines(code: &str) -> impl Iterator<Item = (usize, &str)> {
    code.lines().enumerate().map(|(i, line)| (i + 1, line))
}
