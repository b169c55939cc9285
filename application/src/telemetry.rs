//! Metric names and recording helpers
//!
//! Everything goes through the `metrics` facade. Nothing is recorded until
//! the hosting process installs a recorder (a Prometheus or OTLP exporter);
//! without one the calls are no-ops.

use crate::use_cases::process_feedback::ProcessOutcome;
use council_domain::AgentId;
use metrics::{counter, gauge};

/// Analyses served from the result cache
pub const CACHE_HITS: &str = "council_cache_hits_total";
/// Analyses that had to be dispatched
pub const CACHE_MISSES: &str = "council_cache_misses_total";
/// Agent runs that failed, panicked or timed out, by `agent` and `reason`
pub const AGENT_ERRORS: &str = "council_agent_errors_total";
/// Feedback events accepted onto the queue
pub const FEEDBACK_QUEUED: &str = "council_feedback_queued_total";
/// Deliveries handled by the worker, by `outcome`
pub const FEEDBACK_PROCESSED: &str = "council_feedback_processed_total";
/// Current trust weight, by `agent`
pub const AGENT_WEIGHT: &str = "council_agent_weight";

pub(crate) fn cache_lookup(hit: bool) {
    if hit {
        counter!(CACHE_HITS).increment(1);
    } else {
        counter!(CACHE_MISSES).increment(1);
    }
}

pub(crate) fn agent_error(agent: &AgentId, reason: &'static str) {
    counter!(AGENT_ERRORS, "agent" => agent.to_string(), "reason" => reason).increment(1);
}

pub(crate) fn feedback_queued() {
    counter!(FEEDBACK_QUEUED).increment(1);
}

pub(crate) fn feedback_processed(outcome: &ProcessOutcome) {
    let label = match outcome {
        ProcessOutcome::Applied { .. } => "applied",
        ProcessOutcome::DeadLettered(_) => "dead_lettered",
        ProcessOutcome::Deferred { .. } => "deferred",
    };
    counter!(FEEDBACK_PROCESSED, "outcome" => label).increment(1);
}

pub(crate) fn agent_weight(agent: &AgentId, weight: f64) {
    gauge!(AGENT_WEIGHT, "agent" => agent.to_string()).set(weight);
}

#[cfg(test)]
pub(crate) mod testing {
    use metrics::{
        Counter, CounterFn, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder,
        SharedString, Unit,
    };
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    type Values<T> = Arc<Mutex<HashMap<String, T>>>;

    /// Recorder keeping counters and gauges in maps keyed `name{k=v,...}`
    #[derive(Default, Clone)]
    pub(crate) struct CapturingRecorder {
        counters: Values<u64>,
        gauges: Values<f64>,
    }

    struct Cell<T> {
        key: String,
        values: Values<T>,
    }

    impl CounterFn for Cell<u64> {
        fn increment(&self, value: u64) {
            *self
                .values
                .lock()
                .unwrap()
                .entry(self.key.clone())
                .or_default() += value;
        }

        fn absolute(&self, value: u64) {
            self.values.lock().unwrap().insert(self.key.clone(), value);
        }
    }

    impl GaugeFn for Cell<f64> {
        fn increment(&self, value: f64) {
            *self
                .values
                .lock()
                .unwrap()
                .entry(self.key.clone())
                .or_default() += value;
        }

        fn decrement(&self, value: f64) {
            self.increment(-value);
        }

        fn set(&self, value: f64) {
            self.values.lock().unwrap().insert(self.key.clone(), value);
        }
    }

    fn render(key: &Key) -> String {
        let mut labels: Vec<String> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        if labels.is_empty() {
            return key.name().to_string();
        }
        labels.sort();
        format!("{}{{{}}}", key.name(), labels.join(","))
    }

    impl Recorder for CapturingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            Counter::from_arc(Arc::new(Cell {
                key: render(key),
                values: Arc::clone(&self.counters),
            }))
        }

        fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::from_arc(Arc::new(Cell {
                key: render(key),
                values: Arc::clone(&self.gauges),
            }))
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    impl CapturingRecorder {
        pub(crate) fn counter(&self, key: &str) -> u64 {
            self.counters.lock().unwrap().get(key).copied().unwrap_or(0)
        }

        pub(crate) fn gauge(&self, key: &str) -> Option<f64> {
            self.gauges.lock().unwrap().get(key).copied()
        }

        /// Drive `fut` on a current-thread runtime with this recorder
        /// installed for the calling thread
        pub(crate) fn capture<F: Future>(&self, fut: F) -> F::Output {
            metrics::with_local_recorder(self, || {
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap()
                    .block_on(fut)
            })
        }
    }
}
