//! Run Analysis use case
//!
//! The request path: validate the submission, serve it from the result
//! cache when an equivalent sample was analyzed recently, otherwise fan out
//! to every agent, merge with the current trust weights and cache the
//! result. Storage failures degrade the answer, they never fail it.

use super::dispatch_agents::AgentDispatcher;
use crate::config::AnalysisParams;
use crate::ports::progress::{DispatchProgress, NoProgress};
use crate::ports::result_cache::ResultCache;
use crate::ports::weight_store::WeightStore;
use crate::registry::AgentRegistry;
use crate::telemetry;
use chrono::Utc;
use council_domain::{
    AnalysisId, AnalysisResult, CodeSample, DomainError, Fingerprint, SuggestionMerger,
    WeightSnapshot,
};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during an analysis
#[derive(Error, Debug)]
pub enum RunAnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("No agents registered")]
    NoAgents,
}

/// Input for the RunAnalysis use case
#[derive(Debug, Clone)]
pub struct RunAnalysisInput {
    /// Source text to analyze
    pub code: String,
    /// Language name, e.g. "python"
    pub language: String,
}

impl RunAnalysisInput {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Use case for analyzing one code sample
pub struct RunAnalysisUseCase {
    registry: AgentRegistry,
    cache: Arc<dyn ResultCache>,
    weights: Arc<dyn WeightStore>,
    dispatcher: AgentDispatcher,
    params: AnalysisParams,
    /// Last snapshot read successfully, used while the store is down
    last_known: RwLock<Option<WeightSnapshot>>,
}

impl RunAnalysisUseCase {
    pub fn new(
        registry: AgentRegistry,
        cache: Arc<dyn ResultCache>,
        weights: Arc<dyn WeightStore>,
    ) -> Self {
        let params = AnalysisParams::default();
        Self {
            registry,
            cache,
            weights,
            dispatcher: AgentDispatcher::new(params.dispatch.clone()),
            params,
            last_known: RwLock::new(None),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_params(mut self, params: AnalysisParams) -> Self {
        self.dispatcher = AgentDispatcher::new(params.dispatch.clone());
        self.params = params;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunAnalysisInput,
    ) -> Result<AnalysisResult, RunAnalysisError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunAnalysisInput,
        progress: &dyn DispatchProgress,
    ) -> Result<AnalysisResult, RunAnalysisError> {
        let sample = CodeSample::new(input.code, &input.language, self.params.max_code_bytes)?;
        if self.registry.is_empty() {
            return Err(RunAnalysisError::NoAgents);
        }

        let fingerprint = Fingerprint::of(&sample);
        debug!(fingerprint = fingerprint.short(), "Computed fingerprint");

        let cached = self.lookup_cache(&fingerprint).await;
        telemetry::cache_lookup(cached.is_some());
        if let Some(cached) = cached {
            let result = cached.served_from_cache(AnalysisId::generate());
            info!(
                analysis_id = %result.analysis_id,
                fingerprint = fingerprint.short(),
                "Serving analysis from cache"
            );
            return Ok(result);
        }

        let reports = self
            .dispatcher
            .dispatch(&self.registry, &sample, progress)
            .await;

        let weights = self
            .current_weights()
            .await
            .for_agents(self.registry.ids());
        let findings = SuggestionMerger::merge(&reports, &weights);

        let result = AnalysisResult {
            analysis_id: AnalysisId::generate(),
            fingerprint,
            findings,
            weights,
            agents: reports.iter().map(|r| r.summary()).collect(),
            from_cache: false,
            created_at: Utc::now(),
        };

        info!(
            analysis_id = %result.analysis_id,
            findings = result.findings.len(),
            complete = result.is_complete(),
            "Analysis finished"
        );

        if result.is_complete() {
            self.store_cache(&result).await;
        } else {
            debug!("Not caching partial result");
        }

        Ok(result)
    }

    async fn lookup_cache(&self, fingerprint: &Fingerprint) -> Option<AnalysisResult> {
        if self.params.cache_ttl.is_zero() {
            return None;
        }
        match self.cache.get(fingerprint).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache lookup failed, analyzing uncached: {}", e);
                None
            }
        }
    }

    async fn store_cache(&self, result: &AnalysisResult) {
        if self.params.cache_ttl.is_zero() {
            return;
        }
        if let Err(e) = self
            .cache
            .put(&result.fingerprint, result, self.params.cache_ttl)
            .await
        {
            warn!("Failed to cache analysis result: {}", e);
        }
    }

    /// Current weights, falling back to the last known snapshot and then to
    /// neutral when the store cannot be read
    async fn current_weights(&self) -> WeightSnapshot {
        match self.weights.get_all().await {
            Ok(snapshot) => {
                if let Ok(mut last) = self.last_known.write() {
                    *last = Some(snapshot.clone());
                }
                snapshot
            }
            Err(e) => {
                let fallback = self
                    .last_known
                    .read()
                    .ok()
                    .and_then(|last| last.clone());
                warn!(
                    stale = fallback.is_some(),
                    "Weight store unavailable, scoring with fallback weights: {}", e
                );
                fallback.unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchParams;
    use crate::ports::advisory_engine::{AdvisoryEngine, EngineError};
    use crate::ports::result_cache::CacheError;
    use crate::ports::weight_store::WeightStoreError;
    use crate::telemetry::testing::CapturingRecorder;
    use async_trait::async_trait;
    use council_domain::{
        AgentDescriptor, AgentId, AgentStatus, AgentWeight, Finding, Severity, WeightUpdate,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    // ==================== Mocks ====================

    struct FixedAgent {
        descriptor: AgentDescriptor,
        findings: Vec<(u8, f64)>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl FixedAgent {
        fn new(id: &str, findings: Vec<(u8, f64)>) -> Self {
            Self {
                descriptor: AgentDescriptor::new(id),
                findings,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn hanging(id: &str) -> Self {
            Self {
                delay: Duration::from_secs(3600),
                ..Self::new(id, vec![(5, 1.0)])
            }
        }
    }

    #[async_trait]
    impl AdvisoryEngine for FixedAgent {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        async fn evaluate(&self, _sample: &CodeSample) -> Result<Vec<Finding>, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let id = self.descriptor.id.clone();
            Ok(self
                .findings
                .iter()
                .map(|(sev, conf)| Finding::new(id.clone(), "check", "msg", *sev, *conf))
                .collect())
        }
    }

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, AnalysisResult>>,
        broken: AtomicBool,
    }

    #[async_trait]
    impl ResultCache for MapCache {
        async fn get(&self, fp: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("down".to_string()));
            }
            Ok(self.entries.lock().unwrap().get(fp.as_str()).cloned())
        }

        async fn put(
            &self,
            fp: &Fingerprint,
            result: &AnalysisResult,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("down".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(fp.as_str().to_string(), result.clone());
            Ok(())
        }
    }

    struct FixedWeights {
        snapshot: WeightSnapshot,
        broken: AtomicBool,
    }

    impl FixedWeights {
        fn new(snapshot: WeightSnapshot) -> Self {
            Self {
                snapshot,
                broken: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl WeightStore for FixedWeights {
        async fn get_all(&self) -> Result<WeightSnapshot, WeightStoreError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(WeightStoreError::Unavailable("down".to_string()));
            }
            Ok(self.snapshot.clone())
        }

        async fn records(&self) -> Result<Vec<AgentWeight>, WeightStoreError> {
            Ok(vec![])
        }

        async fn apply_delta(
            &self,
            _agent_id: &AgentId,
            _delta: f64,
        ) -> Result<WeightUpdate, WeightStoreError> {
            Err(WeightStoreError::Unavailable("read-only".to_string()))
        }

        async fn reset(&self) -> Result<(), WeightStoreError> {
            Ok(())
        }
    }

    fn use_case(
        registry: AgentRegistry,
        cache: Arc<MapCache>,
        weights: Arc<FixedWeights>,
    ) -> RunAnalysisUseCase {
        RunAnalysisUseCase::new(registry, cache, weights).with_params(
            AnalysisParams::default().with_dispatch(
                DispatchParams::default().with_agent_timeout(Duration::from_millis(200)),
            ),
        )
    }

    fn five_agents() -> AgentRegistry {
        AgentRegistry::new()
            .register(FixedAgent::new("style", vec![(2, 0.8)]))
            .unwrap()
            .register(FixedAgent::new("naming", vec![(3, 0.5)]))
            .unwrap()
            .register(FixedAgent::new("minimalism", vec![]))
            .unwrap()
            .register(FixedAgent::new("security", vec![(5, 0.9), (4, 0.7)]))
            .unwrap()
            .register(FixedAgent::hanging("docstring"))
            .unwrap()
    }

    // ==================== Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_agent_contributes_nothing() {
        let cache = Arc::new(MapCache::default());
        let weights = Arc::new(FixedWeights::new(WeightSnapshot::new()));
        let uc = use_case(five_agents(), cache.clone(), weights);

        let result = uc
            .execute(RunAnalysisInput::new("def f():\n    return 1\n", "python"))
            .await
            .unwrap();

        assert!(!result.from_cache);
        assert_eq!(result.findings.len(), 4);
        assert!(result.findings.iter().all(|f| f.agent_id().as_str() != "docstring"));

        // Highest severity first
        let severities: Vec<u8> = result.findings.iter().map(|f| f.severity().value()).collect();
        assert_eq!(severities, vec![5, 4, 3, 2]);

        let bands = result.bands();
        assert_eq!(bands.len(), 5);
        assert_eq!(bands[0].severity, Severity::CRITICAL);

        let docstring = &result.agents[4];
        assert_eq!(docstring.agent_id.as_str(), "docstring");
        assert!(matches!(docstring.status, AgentStatus::TimedOut { .. }));

        // Partial results are not cached
        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_variant_is_served_from_cache() {
        let agent = FixedAgent::new("style", vec![(3, 0.6)]);
        let calls = agent.calls.clone();
        let registry = AgentRegistry::new().register(agent).unwrap();
        let cache = Arc::new(MapCache::default());
        let weights = Arc::new(FixedWeights::new(WeightSnapshot::new()));
        let uc = use_case(registry, cache, weights);

        let first = uc
            .execute(RunAnalysisInput::new("x = foo(a, b)\n", "python"))
            .await
            .unwrap();
        let second = uc
            .execute(RunAnalysisInput::new("x=foo( a,b )   \n\n", "python"))
            .await
            .unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_ne!(first.analysis_id, second.analysis_id);
        assert_eq!(first.findings, second.findings);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_outage_degrades_to_uncached() {
        let registry = AgentRegistry::new()
            .register(FixedAgent::new("style", vec![(3, 0.6)]))
            .unwrap();
        let cache = Arc::new(MapCache::default());
        cache.broken.store(true, Ordering::SeqCst);
        let weights = Arc::new(FixedWeights::new(WeightSnapshot::new()));
        let uc = use_case(registry, cache, weights);

        let result = uc
            .execute(RunAnalysisInput::new("x = 1", "python"))
            .await
            .unwrap();

        assert!(!result.from_cache);
        assert_eq!(result.findings.len(), 1);
    }

    #[tokio::test]
    async fn test_scores_use_current_weights() {
        let registry = AgentRegistry::new()
            .register(FixedAgent::new("style", vec![(3, 0.5)]))
            .unwrap()
            .register(FixedAgent::new("naming", vec![(3, 0.5)]))
            .unwrap();
        let snapshot = WeightSnapshot::new().with_weight("style", 2.0);
        let weights = Arc::new(FixedWeights::new(snapshot));
        let uc = use_case(registry, Arc::new(MapCache::default()), weights);

        let result = uc
            .execute(RunAnalysisInput::new("x = 1", "python"))
            .await
            .unwrap();

        assert_eq!(result.findings[0].agent_id().as_str(), "style");
        assert!(result.findings[0].score() > result.findings[1].score());
        assert_eq!(result.weights.weight(&AgentId::new("style")), 2.0);
        assert_eq!(result.weights.weight(&AgentId::new("naming")), 1.0);
        assert_eq!(result.weights.len(), 2);
    }

    #[tokio::test]
    async fn test_weight_outage_falls_back() {
        let registry = AgentRegistry::new()
            .register(FixedAgent::new("style", vec![(3, 0.5)]))
            .unwrap();
        let snapshot = WeightSnapshot::new().with_weight("style", 1.5);
        let weights = Arc::new(FixedWeights::new(snapshot));
        let uc = RunAnalysisUseCase::new(registry, Arc::new(crate::ports::result_cache::NoCache), weights.clone());

        // Never read successfully: neutral
        weights.broken.store(true, Ordering::SeqCst);
        let cold = uc.execute(RunAnalysisInput::new("a = 1", "python")).await.unwrap();
        assert_eq!(cold.weights.weight(&AgentId::new("style")), 1.0);

        // One good read, then an outage: last known snapshot
        weights.broken.store(false, Ordering::SeqCst);
        uc.execute(RunAnalysisInput::new("b = 1", "python")).await.unwrap();
        weights.broken.store(true, Ordering::SeqCst);
        let warm = uc.execute(RunAnalysisInput::new("c = 1", "python")).await.unwrap();
        assert_eq!(warm.weights.weight(&AgentId::new("style")), 1.5);
    }

    #[tokio::test]
    async fn test_rejects_invalid_input() {
        let uc = use_case(
            five_agents(),
            Arc::new(MapCache::default()),
            Arc::new(FixedWeights::new(WeightSnapshot::new())),
        );

        let empty = uc.execute(RunAnalysisInput::new("  \n", "python")).await;
        assert!(matches!(
            empty,
            Err(RunAnalysisError::InvalidInput(DomainError::EmptyCode))
        ));

        let cobol = uc.execute(RunAnalysisInput::new("x", "cobol")).await;
        assert!(matches!(
            cobol,
            Err(RunAnalysisError::InvalidInput(DomainError::UnsupportedLanguage(_)))
        ));
    }

    #[tokio::test]
    async fn test_no_agents() {
        let uc = use_case(
            AgentRegistry::new(),
            Arc::new(MapCache::default()),
            Arc::new(FixedWeights::new(WeightSnapshot::new())),
        );
        let result = uc.execute(RunAnalysisInput::new("x = 1", "python")).await;
        assert!(matches!(result, Err(RunAnalysisError::NoAgents)));
    }

    #[test]
    fn test_cache_hits_and_misses_are_counted() {
        let recorder = CapturingRecorder::default();
        recorder.capture(async {
            let registry = AgentRegistry::new()
                .register(FixedAgent::new("style", vec![(2, 0.5)]))
                .unwrap();
            let uc = use_case(
                registry,
                Arc::new(MapCache::default()),
                Arc::new(FixedWeights::new(WeightSnapshot::new())),
            );
            for _ in 0..3 {
                uc.execute(RunAnalysisInput::new("y = 2\n", "python"))
                    .await
                    .unwrap();
            }
        });

        assert_eq!(recorder.counter("council_cache_misses_total"), 1);
        assert_eq!(recorder.counter("council_cache_hits_total"), 2);
    }
}
