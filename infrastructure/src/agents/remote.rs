//! HTTP-backed advisory engine
//!
//! Posts `{"code": ..., "language": ...}` to a configured endpoint and expects
//! `{"findings": [...]}` back. Agent attribution and severity ceilings are
//! re-applied by the merger, so the remote side cannot impersonate another
//! agent or exceed its ceiling.

use async_trait::async_trait;
use council_application::{AdvisoryEngine, EngineError};
use council_domain::{AgentDescriptor, CodeSample, Finding};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    code: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    #[serde(default)]
    findings: Vec<Finding>,
}

/// An advisory engine reached over HTTP
pub struct RemoteAgent {
    descriptor: AgentDescriptor,
    url: String,
    client: reqwest::Client,
}

impl RemoteAgent {
    /// Build a client for `url`; the request timeout follows the descriptor
    /// so a slow endpoint is cut off even outside the dispatcher.
    pub fn new(descriptor: AgentDescriptor, url: impl Into<String>) -> Result<Self, EngineError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("codecouncil/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = descriptor.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EngineError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            descriptor,
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode a response body into findings
fn parse_findings(body: &str) -> Result<Vec<Finding>, EngineError> {
    serde_json::from_str::<EvaluateResponse>(body)
        .map(|response| response.findings)
        .map_err(|e| EngineError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl AdvisoryEngine for RemoteAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn evaluate(&self, sample: &CodeSample) -> Result<Vec<Finding>, EngineError> {
        let request = EvaluateRequest {
            code: sample.code(),
            language: sample.language().as_str(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Unavailable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(EngineError::Rejected(format!("{} returned {}", self.url, status)));
        }
        if !status.is_success() {
            return Err(EngineError::Unavailable(format!("{} returned {}", self.url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EngineError::Unavailable(format!("Failed to read body: {}", e)))?;
        let findings = parse_findings(&body)?;
        debug!(
            "Remote agent {} returned {} findings",
            self.descriptor.id,
            findings.len()
        );
        Ok(findings)
    }
}
