//! Naming: single-letter and generic names, mixed casing conventions

use super::{finding_at, numbered_lines};
use council_domain::{CodeSample, Finding, Language};
use regex::Regex;
use std::sync::LazyLock;

pub(super) const ID: &str = "naming";
pub(super) const MAX_SEVERITY: u8 = 4;

/// Assignment target at the start of a line, with an optional declarator
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:let\s+(?:mut\s+)?|var\s+|const\s+|auto\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*(?::[^=]*)?=[^=]")
        .expect("hardcoded regex")
});

static PY_CAMEL_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*def\s+([a-z]+[A-Z][A-Za-z0-9]*)\s*\(").expect("hardcoded regex")
});

const GENERIC_NAMES: &[&str] = &["data", "tmp", "temp", "foo", "bar", "obj", "thing", "stuff", "val"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Casing {
    Snake,
    Camel,
}

fn casing(name: &str) -> Option<Casing> {
    let starts_lower = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    if !starts_lower {
        return None;
    }
    let has_upper = name.chars().any(|c| c.is_ascii_uppercase());
    match (name.contains('_'), has_upper) {
        (true, false) => Some(Casing::Snake),
        (false, true) => Some(Casing::Camel),
        _ => None,
    }
}

pub(super) fn check(sample: &CodeSample) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut first_snake = None;
    let mut first_camel = None;

    for (number, line) in numbered_lines(sample.code()) {
        let trimmed = line.trim_start();
        if trimmed.starts_with("for ") || trimmed.starts_with("for(") {
            continue;
        }

        if let Some(caps) = ASSIGNMENT.captures(line) {
            let name = &caps[1];

            if name.len() == 1 && name != "_" {
                findings.push(finding_at(
                    ID,
                    "single-letter",
                    format!("Single-letter name `{}` outside a loop", name),
                    3,
                    0.6,
                    number,
                ));
            } else if GENERIC_NAMES.contains(&name) {
                findings.push(finding_at(
                    ID,
                    "generic-name",
                    format!("`{}` says nothing about what it holds", name),
                    2,
                    0.4,
                    number,
                ));
            }

            match casing(name) {
                Some(Casing::Snake) => {
                    first_snake.get_or_insert(number);
                }
                Some(Casing::Camel) => {
                    first_camel.get_or_insert((number, name.to_string()));
                }
                None => {}
            }
        }

        if sample.language() == Language::Python
            && let Some(caps) = PY_CAMEL_DEF.captures(line)
        {
            findings.push(finding_at(
                ID,
                "function-case",
                format!("Python function `{}` should be snake_case", &caps[1]),
                2,
                0.7,
                number,
            ));
        }
    }

    if let (Some(_), Some((line, name))) = (first_snake, first_camel) {
        findings.push(finding_at(
            ID,
            "mixed-casing",
            format!("`{}` is camelCase but other names use snake_case", name),
            3,
            0.5,
            line,
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str, language: &str) -> Vec<Finding> {
        check(&CodeSample::new(code, language, 100_000).unwrap())
    }

    fn kinds(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.kind()).collect()
    }

    #[test]
    fn test_single_letter_outside_loop() {
        let findings = run("x = load()\nfor i in range(3):\n    pass\n", "python");
        assert_eq!(kinds(&findings), vec!["single-letter"]);
        assert_eq!(findings[0].location().unwrap().line, 1);
    }

    #[test]
    fn test_generic_name() {
        let findings = run("let data = fetch();\n", "rust");
        assert_eq!(kinds(&findings), vec!["generic-name"]);
    }

    #[test]
    fn test_mixed_casing() {
        let findings = run("user_name = 'a'\nuserAge = 3\n", "python");
        assert_eq!(kinds(&findings), vec!["mixed-casing"]);
        assert_eq!(findings[0].location().unwrap().line, 2);
    }

    #[test]
    fn test_python_camel_case_function() {
        let findings = run("def loadUser(user_id):\n    return user_id\n", "python");
        assert_eq!(kinds(&findings), vec!["function-case"]);
    }

    #[test]
    fn test_comparison_is_not_assignment() {
        assert!(run("if x == 1:\n    pass\n", "python").is_empty());
    }
}
