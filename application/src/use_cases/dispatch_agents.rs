//! Agent dispatch use case
//!
//! Fans one code sample out to every registered agent concurrently and fans
//! the outcomes back in. Each agent runs in its own task under its own
//! timeout; a slow, failing or panicking agent only ever affects its own
//! report. Wall-clock latency is bounded by the slowest agent's timeout (or
//! the outer deadline), not by the sum.

use crate::config::DispatchParams;
use crate::ports::advisory_engine::AdvisoryEngine;
use crate::ports::progress::DispatchProgress;
use crate::registry::AgentRegistry;
use crate::telemetry;
use council_domain::{AgentOutcome, AgentReport, CodeSample};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Concurrent fan-out to all registered agents
#[derive(Debug, Clone, Default)]
pub struct AgentDispatcher {
    params: DispatchParams,
}

impl AgentDispatcher {
    pub fn new(params: DispatchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Run every agent against `sample`
    ///
    /// Never fails: each agent's failure is captured in its report. Reports
    /// are returned in registration order regardless of completion order.
    pub async fn dispatch(
        &self,
        registry: &AgentRegistry,
        sample: &CodeSample,
        progress: &dyn DispatchProgress,
    ) -> Vec<AgentReport> {
        let total = registry.len();
        info!(agents = total, language = %sample.language(), "Dispatching agents");
        progress.on_dispatch_start(total);

        let started = Instant::now();
        let sample = Arc::new(sample.clone());
        let mut join_set = JoinSet::new();

        for (index, engine) in registry.agents().iter().enumerate() {
            let engine = Arc::clone(engine);
            let sample = Arc::clone(&sample);
            let timeout = engine
                .descriptor()
                .effective_timeout(self.params.agent_timeout);

            join_set.spawn(async move {
                let outcome = Self::run_agent(engine.as_ref(), &sample, timeout).await;
                (index, outcome)
            });
        }

        let mut reports: Vec<Option<AgentReport>> = vec![None; total];
        let deadline = self.params.deadline.map(|d| started + d);

        loop {
            let joined = match deadline {
                Some(at) => match tokio::time::timeout_at(at, join_set.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!(
                            pending = join_set.len(),
                            "Dispatch deadline reached, abandoning remaining agents"
                        );
                        join_set.abort_all();
                        break;
                    }
                },
                None => join_set.join_next().await,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, outcome)) => {
                    let descriptor = registry.agents()[index].descriptor().clone();
                    let report = AgentReport::new(descriptor, outcome);
                    progress.on_agent_complete(report.agent_id(), &report.summary().status);
                    reports[index] = Some(report);
                }
                Err(e) => {
                    // Panics are caught inside the task; this is an abort.
                    debug!("Agent task join error: {}", e);
                }
            }
        }

        let abandoned_after = self
            .params
            .deadline
            .map(duration_ms)
            .unwrap_or_else(|| duration_ms(self.params.agent_timeout));

        let reports: Vec<AgentReport> = reports
            .into_iter()
            .enumerate()
            .map(|(index, report)| {
                report.unwrap_or_else(|| {
                    let descriptor = registry.agents()[index].descriptor().clone();
                    telemetry::agent_error(&descriptor.id, "abandoned");
                    AgentReport::new(descriptor, AgentOutcome::timed_out(abandoned_after))
                })
            })
            .collect();

        let completed = reports.iter().filter(|r| r.outcome.is_completed()).count();
        info!(
            completed,
            failed = total - completed,
            elapsed_ms = duration_ms(started.elapsed()),
            "Dispatch finished"
        );
        progress.on_dispatch_complete();
        reports
    }

    /// Run one agent under its timeout, converting every failure into an
    /// outcome
    async fn run_agent(
        engine: &dyn AdvisoryEngine,
        sample: &CodeSample,
        timeout: Duration,
    ) -> AgentOutcome {
        let id = &engine.descriptor().id;
        let started = Instant::now();
        let call = AssertUnwindSafe(engine.evaluate(sample)).catch_unwind();

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(Ok(findings))) => {
                let elapsed_ms = duration_ms(started.elapsed());
                info!(agent = %id, findings = findings.len(), elapsed_ms, "Agent completed");
                AgentOutcome::completed(findings, elapsed_ms)
            }
            Ok(Ok(Err(e))) => {
                warn!(agent = %id, "Agent failed: {}", e);
                telemetry::agent_error(id, "failed");
                AgentOutcome::failed(e.to_string())
            }
            Ok(Err(_panic)) => {
                warn!(agent = %id, "Agent panicked");
                telemetry::agent_error(id, "panicked");
                AgentOutcome::failed("agent panicked")
            }
            Err(_) => {
                warn!(agent = %id, timeout_ms = duration_ms(timeout), "Agent timed out");
                telemetry::agent_error(id, "timed_out");
                AgentOutcome::timed_out(duration_ms(timeout))
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
