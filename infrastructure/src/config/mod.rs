//! Configuration file loading for codecouncil
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/codecouncil/config.toml`
//! 5. Default values

mod file_config;
mod issue;
mod loader;
mod sections;

pub use file_config::FileConfig;
pub use issue::{ConfigIssue, ConfigIssueCode, IssueSeverity};
pub use loader::{ConfigLoader, ConfigSource};
pub use sections::{
    FileCacheConfig, FileDispatchConfig, FileLimitsConfig, FileLoggingConfig, FileQueueConfig,
    FileRemoteAgentConfig, FileWeightsConfig, FileWorkerConfig,
};
