//! Infrastructure layer for codecouncil
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the built-in and remote advisory engines, weight
//! stores, the result cache, the feedback queue and ledger, the weight audit
//! log, and configuration file loading.

pub mod agents;
pub mod cache;
pub mod config;
mod fs_lock;
pub mod logging;
pub mod queue;
pub mod weights;

// Re-export commonly used types
#[cfg(feature = "remote-agents")]
pub use agents::RemoteAgent;
pub use agents::{BUILTIN_AGENTS, PanelError, RuleAgent, build_registry};
pub use cache::{FileResultCache, InMemoryResultCache};
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, ConfigSource, FileCacheConfig, FileConfig,
    FileDispatchConfig, FileLimitsConfig, FileLoggingConfig, FileQueueConfig,
    FileRemoteAgentConfig, FileWeightsConfig, FileWorkerConfig, IssueSeverity,
};
pub use logging::{JsonlWeightAuditLog, SyncPolicy};
pub use queue::{
    DatabaseError, DeadLetter, InMemoryFeedbackLedger, InMemoryFeedbackQueue, SqliteFeedbackLedger,
    SqliteFeedbackQueue,
};
pub use weights::{FileWeightStore, InMemoryWeightStore};
