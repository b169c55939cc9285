//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Code sample is empty")]
    EmptyCode,

    #[error("Code too large: {size} bytes, max {max}")]
    CodeTooLarge { size: usize, max: usize },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid agent id: {0:?}")]
    InvalidAgentId(String),

    #[error("Duplicate agent id: {0}")]
    DuplicateAgent(String),
}

impl DomainError {
    /// Check if this error was caused by the submitted code sample itself
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyCode
                | DomainError::CodeTooLarge { .. }
                | DomainError::UnsupportedLanguage(_)
        )
    }
}
