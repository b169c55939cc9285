//! Content fingerprints for the result cache
//!
//! Normalization is deliberately shallow: it is not a parser, only consistent
//! enough that cosmetic edits (indentation, spacing around operators,
//! comments, blank lines) map to the same key.

use super::code_sample::{CodeSample, Language};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Characters around which whitespace is insignificant
const PUNCTUATION: &[char] = &[
    '=', '+', '-', '*', '/', '<', '>', '!', '&', '|', ',', ';', ':', '{', '}', '(', ')', '[',
    ']',
];

/// Normalize code for fingerprinting.
///
/// Strips `#` (for hash-comment languages) and `//` line comments, drops
/// whitespace next to operators and punctuation, collapses remaining
/// whitespace runs to one space and removes blank lines.
pub fn normalize_code(code: &str, language: Language) -> String {
    code.lines()
        .map(|line| normalize_line(strip_comment(line, language)))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_comment(line: &str, language: Language) -> &str {
    let slash = line.find("//");
    let hash = if language.uses_hash_comments() {
        line.find('#')
    } else {
        None
    };
    match (slash, hash) {
        (Some(a), Some(b)) => &line[..a.min(b)],
        (Some(a), None) | (None, Some(a)) => &line[..a],
        (None, None) => line,
    }
}

fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;

    for ch in line.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let after_punct = out.chars().last().is_some_and(|c| PUNCTUATION.contains(&c));
            if !out.is_empty() && !after_punct && !PUNCTUATION.contains(&ch) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }

    out
}

/// SHA-256 of the language tag plus normalized code (Value Object)
///
/// # Example
///
/// ```
/// use council_domain::{CodeSample, Fingerprint};
///
/// let a = CodeSample::new("x=1\ny = x+2\n", "python", 1024).unwrap();
/// let b = CodeSample::new("x = 1\n\n   y=x + 2   # sum\n", "python", 1024).unwrap();
/// assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(sample: &CodeSample) -> Self {
        let normalized = normalize_code(sample.code(), sample.language());
        let mut hasher = Sha256::new();
        hasher.update(sample.language().as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(normalized.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap an already computed digest (e.g. read back from a cache key)
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex chars, for log lines
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    /// Whether the digest is all hex digits, and so safe as a file name
    pub fn is_hex(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
