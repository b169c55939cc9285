//! Style: line length, trailing whitespace, indentation, blank lines

use super::{finding_at, numbered_lines};
use council_domain::{CodeSample, Finding};

pub(super) const ID: &str = "style";
pub(super) const MAX_SEVERITY: u8 = 3;

const MAX_LINE_LEN: usize = 100;
const MAX_BLANK_RUN: usize = 2;

pub(super) fn check(sample: &CodeSample) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut blank_run = 0;
    let mut tab_indented = None;
    let mut space_indented = None;

    for (number, line) in numbered_lines(sample.code()) {
        let width = line.chars().count();
        if width > MAX_LINE_LEN {
            findings.push(finding_at(
                ID,
                "line-length",
                format!("Line is {} characters long (limit {})", width, MAX_LINE_LEN),
                2,
                0.9,
                number,
            ));
        }

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == MAX_BLANK_RUN + 1 {
                findings.push(finding_at(
                    ID,
                    "blank-lines",
                    "More than two consecutive blank lines",
                    1,
                    0.6,
                    number,
                ));
            }
        } else {
            blank_run = 0;
            if line.ends_with(' ') || line.ends_with('\t') {
                findings.push(finding_at(
                    ID,
                    "trailing-whitespace",
                    "Trailing whitespace",
                    1,
                    0.95,
                    number,
                ));
            }
        }

        if line.starts_with('\t') {
            tab_indented.get_or_insert(number);
        } else if line.starts_with(' ') && !line.trim().is_empty() {
            space_indented.get_or_insert(number);
        }
    }

    if let (Some(tabs), Some(spaces)) = (tab_indented, space_indented) {
        findings.push(finding_at(
            ID,
            "mixed-indentation",
            format!(
                "Indentation mixes tabs (line {}) and spaces (line {})",
                tabs, spaces
            ),
            3,
            0.8,
            tabs.max(spaces),
        ));
    }

    findings
}
