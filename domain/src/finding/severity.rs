//! Severity scale for findings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding on a 1..=5 scale (Value Object)
///
/// Out-of-range values are clamped into the scale on construction, so a
/// `Severity` is always valid.
///
/// | value | label    |
/// |-------|----------|
/// | 1     | hint     |
/// | 2     | info     |
/// | 3     | warning  |
/// | 4     | error    |
/// | 5     | critical |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: Severity = Severity(1);
    pub const MAX: Severity = Severity(5);

    pub const HINT: Severity = Severity(1);
    pub const INFO: Severity = Severity(2);
    pub const WARNING: Severity = Severity(3);
    pub const ERROR: Severity = Severity(4);
    pub const CRITICAL: Severity = Severity(5);

    /// Create a severity, clamping into 1..=5
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// Lower this severity to `ceiling` if it exceeds it
    pub fn capped_at(self, ceiling: Severity) -> Self {
        self.min(ceiling)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "hint",
            2 => "info",
            3 => "warning",
            4 => "error",
            _ => "critical",
        }
    }

    /// All severities, highest first
    pub fn descending() -> impl Iterator<Item = Severity> {
        (Self::MIN.0..=Self::MAX.0).rev().map(Severity)
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::INFO
    }
}

impl From<u8> for Severity {
    fn from(value: u8) -> Self {
        Severity::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
