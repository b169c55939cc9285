//! Input limits and caching parameters.

use super::dispatch_params::DispatchParams;
use council_domain::DEFAULT_MAX_CODE_BYTES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of a cached analysis (7 days)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub max_code_bytes: usize,
    pub cache_ttl: Duration,
    pub dispatch: DispatchParams,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            max_code_bytes: DEFAULT_MAX_CODE_BYTES,
            cache_ttl: DEFAULT_CACHE_TTL,
            dispatch: DispatchParams::default(),
        }
    }
}

impl AnalysisParams {
    // ==================== Builder Methods ====================

    pub fn with_max_code_bytes(mut self, max: usize) -> Self {
        self.max_code_bytes = max;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchParams) -> Self {
        self.dispatch = dispatch;
        self
    }
}
