//! Application layer for codecouncil
//!
//! This crate contains use cases, port definitions, the agent registry and
//! application parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod registry;
pub mod telemetry;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AnalysisParams, DispatchParams, WorkerParams};
pub use ports::{
    advisory_engine::{AdvisoryEngine, EngineError},
    audit_log::{AuditEvent, NoAuditLog, WeightAuditLog},
    feedback_ledger::{FeedbackLedger, LedgerError},
    feedback_queue::{DeadLetterReason, Delivery, FeedbackQueue, QueueDepth, QueueError, Receipt},
    progress::{DispatchProgress, NoProgress},
    result_cache::{CacheError, NoCache, ResultCache},
    weight_store::{WeightStore, WeightStoreError},
};
pub use registry::AgentRegistry;
pub use use_cases::dispatch_agents::AgentDispatcher;
pub use use_cases::process_feedback::{
    FeedbackProcessor, FeedbackStage, ProcessOutcome, WorkerStats,
};
pub use use_cases::run_analysis::{RunAnalysisError, RunAnalysisInput, RunAnalysisUseCase};
pub use use_cases::submit_feedback::{
    DEFAULT_ENQUEUE_TIMEOUT, FeedbackAck, SubmitFeedbackError, SubmitFeedbackInput,
    SubmitFeedbackUseCase,
};
pub use use_cases::train_weights::{RlTrainer, TrainingStep};
