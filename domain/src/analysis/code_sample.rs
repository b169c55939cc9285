//! Code sample value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default upper bound on submitted code size
pub const DEFAULT_MAX_CODE_BYTES: usize = 100_000;

/// Languages accepted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Rust,
    C,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Go,
        Language::Rust,
        Language::C,
        Language::Cpp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    /// Guess the language from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            "c" | "h" => Some(Language::C),
            "cc" | "cpp" | "cxx" | "hpp" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Whether `#` starts a line comment in this language
    pub fn uses_hash_comments(&self) -> bool {
        matches!(self, Language::Python)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == lower)
            .ok_or_else(|| DomainError::UnsupportedLanguage(s.to_string()))
    }
}

/// A code sample accepted for analysis (Value Object)
///
/// # Example
///
/// ```
/// use council_domain::{CodeSample, Language};
///
/// let sample = CodeSample::new("def f():\n    return 1\n", "Python", 1024).unwrap();
/// assert_eq!(sample.language(), Language::Python);
///
/// assert!(CodeSample::new("   \n", "python", 1024).is_err());
/// assert!(CodeSample::new("x = 1", "cobol", 1024).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSample {
    code: String,
    language: Language,
}

impl CodeSample {
    /// Validate and build a sample
    ///
    /// Rejects empty code, code larger than `max_bytes`, and unsupported
    /// languages.
    pub fn new(
        code: impl Into<String>,
        language: &str,
        max_bytes: usize,
    ) -> Result<Self, DomainError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::EmptyCode);
        }
        if code.len() > max_bytes {
            return Err(DomainError::CodeTooLarge {
                size: code.len(),
                max: max_bytes,
            });
        }
        let language = language.parse()?;
        Ok(Self { code, language })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> Language {
        self.language
    }
}
