//! Weight store configuration from TOML (`[weights]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw weight store configuration
///
/// ```toml
/// [weights]
/// path = "~/.local/share/codecouncil/weights.json"
/// ```
///
/// Without a path, weights go to `weights.json` under the platform data
/// directory (`~/.local/share/codecouncil` on Linux), so the worker and the
/// analyze command share them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWeightsConfig {
    pub path: Option<PathBuf>,
}

impl FileWeightsConfig {
    /// Configured path with a leading `~` expanded, else the default
    ///
    /// `None` only when the platform has no data directory.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(p) => Some(expand_home(p)),
            None => data_path("weights.json"),
        }
    }
}

/// `name` under the per-user data directory for codecouncil
pub(crate) fn data_path(name: &str) -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("codecouncil").join(name))
}

pub(crate) fn expand_home(path: &std::path::Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
