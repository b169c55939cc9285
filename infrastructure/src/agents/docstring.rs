//! Documentation: public items without doc comments, leftover TODO markers

use super::finding_at;
use council_domain::{CodeSample, Finding, Language};
use regex::Regex;
use std::sync::LazyLock;

pub(super) const ID: &str = "docstring";
pub(super) const MAX_SEVERITY: u8 = 3;

static PY_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:async\s+)?(def|class)\s+([A-Za-z]\w*)").expect("hardcoded regex")
});

static RUST_PUB_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*pub(?:\([^)]*\))?\s+(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+(\w+)")
        .expect("hardcoded regex")
});

static JS_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*export\s+(?:default\s+)?(?:async\s+)?(?:function\*?|class)\s+(\w+)")
        .expect("hardcoded regex")
});

static GO_EXPORTED_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^func\s+(?:\([^)]*\)\s*)?([A-Z]\w*)\s*\(").expect("hardcoded regex")
});

static JAVA_PUBLIC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*public\s+(?:static\s+|final\s+|synchronized\s+)*[\w<>\[\],?]+\s+(\w+)\s*\(")
        .expect("hardcoded regex")
});

static TODO_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(TODO|FIXME|XXX)\b").expect("hardcoded regex"));

pub(super) fn check(sample: &CodeSample) -> Vec<Finding> {
    let lines: Vec<&str> = sample.code().lines().collect();
    let language = sample.language();
    let mut findings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;

        if let Some(name) = undocumented_item(&lines, index, language) {
            let confidence = match language {
                Language::Python => 0.6,
                Language::Java => 0.4,
                _ => 0.5,
            };
            findings.push(finding_at(
                ID,
                "missing-docstring",
                format!("Public item `{name}` has no documentation"),
                3,
                confidence,
                number,
            ));
        }

        if let Some(caps) = TODO_MARKER.captures(line) {
            findings.push(finding_at(
                ID,
                "todo-marker",
                format!("{} marker left in code", &caps[1]),
                1,
                0.5,
                number,
            ));
        }
    }

    findings
}

/// Name of the public item declared at `index` when it lacks documentation
fn undocumented_item<'a>(lines: &[&'a str], index: usize, language: Language) -> Option<&'a str> {
    let line = lines[index];
    match language {
        Language::Python => {
            let caps = PY_DEF.captures(line)?;
            let name = caps.get(2)?.as_str();
            if name.starts_with('_') || has_python_docstring(lines, index) {
                return None;
            }
            Some(name)
        }
        Language::Rust => {
            let name = RUST_PUB_FN.captures(line)?.get(1)?.as_str();
            let previous = previous_line(lines, index, |l| l.starts_with("#["));
            (!(previous.starts_with("///") || previous.starts_with("#[doc"))).then_some(name)
        }
        Language::JavaScript | Language::TypeScript => {
            let name = JS_EXPORT.captures(line)?.get(1)?.as_str();
            let previous = previous_line(lines, index, |l| l.starts_with('@'));
            (!(previous.ends_with("*/") || previous.starts_with("//"))).then_some(name)
        }
        Language::Go => {
            let name = GO_EXPORTED_FUNC.captures(line)?.get(1)?.as_str();
            let previous = previous_line(lines, index, |_| false);
            (!previous.starts_with("//")).then_some(name)
        }
        Language::Java => {
            let name = JAVA_PUBLIC_METHOD.captures(line)?.get(1)?.as_str();
            let previous = previous_line(lines, index, |l| l.starts_with('@'));
            (!previous.ends_with("*/")).then_some(name)
        }
        Language::C | Language::Cpp => None,
    }
}

/// Trimmed line above `index`, skipping lines `skip` accepts.
///
/// Empty at the top of the file, which reads as undocumented.
fn previous_line<'a>(lines: &[&'a str], index: usize, skip: impl Fn(&str) -> bool) -> &'a str {
    lines[..index]
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| !skip(l))
        .unwrap_or("")
}

/// Whether the first statement after a def/class header is a string literal
fn has_python_docstring(lines: &[&str], index: usize) -> bool {
    // Headers may wrap across lines; the body starts after the first `:`-terminated line.
    let Some(header_end) = lines[index..]
        .iter()
        .position(|l| l.trim_end().ends_with(':'))
        .map(|offset| index + offset)
    else {
        return false;
    };

    lines[header_end + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .is_some_and(|first| {
            let first = first.trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B']);
            first.starts_with('"') || first.starts_with('\'')
        })
}
