//! Structured configuration issues
//!
//! Validation never fails config loading outright; it returns every issue it
//! finds so the CLI can print them all at once and refuse to start only on
//! errors.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A duration or count that must be positive is zero
    ZeroValue { field: String },
    /// `[dispatch] agents` names an agent that does not exist
    UnknownAgent { name: String },
    /// Two agents share one id
    DuplicateAgent { id: String },
    /// An agent id is empty, too long or contains disallowed characters
    InvalidAgentId { id: String },
    /// A remote agent's severity ceiling is outside 1..=5
    SeverityOutOfRange { agent: String, value: u8 },
    /// A remote agent has no URL
    MissingUrl { agent: String },
    /// Applied feedback would be forgotten before a stale claim expires
    RetentionTooShort,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: IssueSeverity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }

    pub(crate) fn zero(field: &str) -> Self {
        Self::error(
            ConfigIssueCode::ZeroValue {
                field: field.to_string(),
            },
            format!("{field} must be greater than zero"),
        )
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
