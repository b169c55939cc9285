//! Analysis inputs and results.
//!
//! - [`CodeSample`] — validated code plus its language tag
//! - [`Fingerprint`] — whitespace-insensitive content key used for caching
//! - [`AnalysisResult`] — merged, scored output of one analysis

pub mod code_sample;
pub mod fingerprint;
pub mod result;

pub use code_sample::{CodeSample, DEFAULT_MAX_CODE_BYTES, Language};
pub use fingerprint::{Fingerprint, normalize_code};
pub use result::{AnalysisId, AnalysisResult};
