//! Minimalism: mutable defaults, redundant comparisons, duplicated lines,
//! unused imports

use super::{finding_at, numbered_lines};
use council_domain::{CodeSample, Finding, Language};
use regex::Regex;
use std::sync::LazyLock;

pub(super) const ID: &str = "minimalism";
pub(super) const MAX_SEVERITY: u8 = 5;

static MUTABLE_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*def\s+\w+\s*\(.*=\s*(\[\s*\]|\{\s*\}|set\(\s*\))").expect("hardcoded regex")
});

static BOOL_COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[!=]==?\s*(True|False|true|false)\b").expect("hardcoded regex")
});

static PY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:import\s+(\w+)|from\s+[\w.]+\s+import\s+(\w+))\s*$").expect("hardcoded regex")
});

/// Lines too trivial to count as duplicated logic
fn is_trivial(line: &str) -> bool {
    line.len() <= 3 || line.chars().all(|c| "{}()[];,".contains(c))
}

pub(super) fn check(sample: &CodeSample) -> Vec<Finding> {
    let code = sample.code();
    let python = sample.language() == Language::Python;
    let mut findings = Vec::new();
    let mut previous: Option<&str> = None;

    for (number, line) in numbered_lines(code) {
        if python && MUTABLE_DEFAULT.is_match(line) {
            findings.push(finding_at(
                ID,
                "mutable-default",
                "Mutable default argument is shared between calls",
                5,
                0.9,
                number,
            ));
        }

        if BOOL_COMPARISON.is_match(line) {
            findings.push(finding_at(
                ID,
                "bool-comparison",
                "Comparison against a boolean literal is redundant",
                2,
                0.7,
                number,
            ));
        }

        let trimmed = line.trim();
        if !trimmed.is_empty() && !is_trivial(trimmed) && previous == Some(trimmed) {
            findings.push(finding_at(
                ID,
                "duplicate-line",
                "Line repeats the previous line",
                2,
                0.5,
                number,
            ));
        }
        if !trimmed.is_empty() {
            previous = Some(trimmed);
        }

        if python
            && let Some(caps) = PY_IMPORT.captures(line)
            && let Some(name) = caps.get(1).or_else(|| caps.get(2))
            && !is_used_elsewhere(code, name.as_str())
        {
            findings.push(finding_at(
                ID,
                "unused-import",
                format!("`{}` is imported but never used", name.as_str()),
                3,
                0.6,
                number,
            ));
        }
    }

    findings
}

fn is_used_elsewhere(code: &str, name: &str) -> bool {
    let Ok(word) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
        return true;
    };
    word.find_iter(code).count() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(code: &str, language: &str) -> Vec<String> {
        check(&CodeSample::new(code, language, 100_000).unwrap())
            .iter()
            .map(|f| f.kind().to_string())
            .collect()
    }

    #[test]
    fn test_mutable_default_is_critical() {
        let code = "def add(item, items=[]):\n    return items\n";
        let findings = check(&CodeSample::new(code, "python", 1024).unwrap());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity().value(), 5);
    }

    #[test]
    fn test_bool_comparison() {
        assert_eq!(kinds("if (done === true) {}\n", "javascript"), vec!["bool-comparison"]);
    }

    #[test]
    fn test_duplicate_line() {
        assert_eq!(
            kinds("total += price\ntotal += price\n", "python"),
            vec!["duplicate-line"]
        );
        // Closing braces repeat legitimately
        assert!(kinds("}\n}\n", "rust").is_empty());
    }

    #[test]
    fn test_unused_import() {
        assert_eq!(
            kinds("import os\nimport sys\nprint(sys.argv)\n", "python"),
            vec!["unused-import"]
        );
        assert!(kinds("use std::io;\n", "rust").is_empty());
    }
}
