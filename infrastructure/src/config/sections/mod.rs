//! One struct per TOML section

mod cache;
mod dispatch;
mod limits;
mod logging;
mod queue;
mod remote_agents;
mod weights;
mod worker;

pub use cache::FileCacheConfig;
pub use dispatch::FileDispatchConfig;
pub use limits::FileLimitsConfig;
pub use logging::FileLoggingConfig;
pub use queue::FileQueueConfig;
pub use remote_agents::FileRemoteAgentConfig;
pub use weights::FileWeightsConfig;
pub use worker::FileWorkerConfig;
