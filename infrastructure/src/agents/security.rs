//! Security: secrets in source, dynamic evaluation, injection-prone calls,
//! unsafe deserialization, runaway loops, unchecked memory operations

use super::finding_at;
use council_domain::{CodeSample, Finding, Language};
use regex::Regex;
use std::sync::LazyLock;

pub(super) const ID: &str = "security";
pub(super) const MAX_SEVERITY: u8 = 5;

static HARDCODED_SECRET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b\w*(password|passwd|secret|api_?key|access_?key|private_?key|auth_?token)\w*["']?\s*[:=]\s*["'][^"'\s]{4,}["']"#,
    )
    .expect("hardcoded regex")
});

static DYNAMIC_EVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^.\w])(eval|exec)\s*\(|\bnew\s+Function\s*\(").expect("hardcoded regex")
});

static SHELL_INJECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bos\.(system|popen)\s*\(|\bsubprocess\.\w+\(.*shell\s*=\s*True|\bchild_process\.exec(Sync)?\s*\(|\bexecSync\s*\(|Runtime\.getRuntime\(\)\.exec\s*\(",
    )
    .expect("hardcoded regex")
});

static SQL_CONCATENATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)["'][^"']*\b(select\s.+\sfrom|insert\s+into|update\s+\w+\s+set|delete\s+from)\b[^"']*["']\s*(\+|%|\.format\s*\()"#,
    )
    .expect("hardcoded regex")
});

static SQL_INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\bf["'][^"']*|`[^`]*)\b(select\s.+\sfrom|insert\s+into|update\s+\w+\s+set|delete\s+from)\b[^"'`]*(\{|\$\{)"#,
    )
    .expect("hardcoded regex")
});

static UNSAFE_DESERIALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpickle\.loads?\s*\(|\byaml\.load\s*\(").expect("hardcoded regex")
});

static WHILE_TRUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*while\s+(True|1)\s*:").expect("hardcoded regex"));

static LOOP_EXIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(break|return|raise)\b|\bsys\.exit\s*\(").expect("hardcoded regex")
});

static DETACHED_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(asyncio|loop)\.create_task\s*\(").expect("hardcoded regex")
});

static UNBOUNDED_COPY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(gets|strcpy|strcat|sprintf)\s*\(").expect("hardcoded regex")
});

static UNSAFE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bunsafe\s*\{").expect("hardcoded regex"));

pub(super) fn check(sample: &CodeSample) -> Vec<Finding> {
    let language = sample.language();
    let lines: Vec<&str> = sample.code().lines().collect();
    let mut findings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if is_comment(line.trim_start(), language) {
            continue;
        }
        let number = index + 1;
        let mut flag = |kind: &str, message: &str, severity: u8, confidence: f64| {
            findings.push(finding_at(ID, kind, message, severity, confidence, number));
        };

        if HARDCODED_SECRET.is_match(line) {
            flag("hardcoded-secret", "Credential appears to be hardcoded", 5, 0.8);
        }

        if matches!(
            language,
            Language::Python | Language::JavaScript | Language::TypeScript
        ) && DYNAMIC_EVAL.is_match(line)
        {
            flag("dynamic-eval", "Dynamic code evaluation", 5, 0.7);
        }

        if SHELL_INJECTION.is_match(line) {
            flag("shell-injection", "Command built for a shell may be injectable", 5, 0.75);
        }

        if SQL_CONCATENATION.is_match(line) || SQL_INTERPOLATION.is_match(line) {
            flag("sql-injection", "SQL assembled from strings; use bound parameters", 5, 0.6);
        }

        if language == Language::Python
            && UNSAFE_DESERIALIZE.is_match(line)
            && !line.contains("SafeLoader")
        {
            flag("unsafe-deserialization", "Deserializing untrusted data can run code", 4, 0.7);
        }

        if language == Language::Python
            && WHILE_TRUE.is_match(line)
            && !loop_has_exit(&lines, index)
        {
            flag("unbounded-loop", "Infinite loop without break or return", 5, 0.6);
        }

        if language == Language::Python && DETACHED_TASK.is_match(line) {
            flag(
                "detached-task",
                "Task reference is dropped; it may be garbage collected mid-flight",
                5,
                0.7,
            );
        }

        if matches!(language, Language::C | Language::Cpp) && UNBOUNDED_COPY.is_match(line) {
            flag("unbounded-copy", "Unbounded buffer write", 4, 0.7);
        }

        if language == Language::Rust && UNSAFE_BLOCK.is_match(line) {
            flag("unsafe-block", "Unsafe block needs a safety argument", 3, 0.4);
        }
    }

    findings
}

fn is_comment(trimmed: &str, language: Language) -> bool {
    if language.uses_hash_comments() {
        trimmed.starts_with('#')
    } else {
        trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Whether the indented block under the `while` at `index` can leave the loop
fn loop_has_exit(lines: &[&str], index: usize) -> bool {
    let header_indent = indent_of(lines[index]);
    lines[index + 1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .take_while(|l| indent_of(l) > header_indent)
        .any(|l| LOOP_EXIT.is_match(l))
}
