//! Console output formatter for analysis results, weights and config

use colored::{ColoredString, Colorize};
use council_application::{FeedbackAck, WorkerStats};
use council_domain::{AgentStatus, AgentWeight, AnalysisResult, ScoredFinding, Severity};
use council_infrastructure::{ConfigIssue, ConfigSource};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete analysis: severity bands, then agent status
    pub fn format(result: &AnalysisResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Council Findings"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Analysis:".cyan().bold(),
            result.analysis_id
        ));
        let cache_note = if result.from_cache {
            " (cached)".dimmed().to_string()
        } else {
            String::new()
        };
        output.push_str(&format!(
            "{} {}{}\n",
            "Fingerprint:".cyan().bold(),
            result.fingerprint.short(),
            cache_note
        ));

        for band in result.bands() {
            if band.is_empty() {
                continue;
            }
            output.push_str(&Self::section_header(&format!(
                "{} ({})",
                Self::severity_label(band.severity),
                band.findings.len()
            )));
            for finding in &band.findings {
                output.push_str(&Self::finding_line(finding));
            }
        }

        if result.findings.is_empty() {
            output.push_str(&format!("\n{}\n", "No findings.".green()));
        }

        output.push_str(&Self::section_header("Agents"));
        for summary in &result.agents {
            let weight = result.weights.weight(&summary.agent_id);
            output.push_str(&format!(
                "  {:<14} {}  {}\n",
                summary.agent_id.as_str(),
                Self::status_text(&summary.status),
                format!("weight {:.2}", weight).dimmed()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &AnalysisResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line confirmation for an enqueued feedback event
    pub fn format_feedback_ack(ack: &FeedbackAck) -> String {
        let verdict = if ack.event.accepted {
            "accepted".green()
        } else {
            "rejected".red()
        };
        format!(
            "{} {} {} for {} (rating {}, message {})",
            "v".green(),
            ack.event.finding_id,
            verdict,
            ack.event.agent_id,
            ack.event.rating,
            ack.message_id
        )
    }

    /// Summary of a worker drain
    pub fn format_worker_stats(stats: &WorkerStats) -> String {
        format!(
            "{} applied, {} dead-lettered, {} deferred",
            stats.applied.to_string().green(),
            stats.dead_lettered.to_string().yellow(),
            stats.deferred.to_string().red()
        )
    }

    /// Table of agent weights, sorted by agent id
    pub fn format_weights(records: &[AgentWeight]) -> String {
        let mut output = Self::section_header("Agent Weights");
        if records.is_empty() {
            output.push_str("  (no agents recorded yet)\n");
            return output;
        }

        output.push_str(&format!(
            "  {:<14} {:>7} {:>8}  {}\n",
            "agent".bold(),
            "weight".bold(),
            "updates".bold(),
            "last update".bold()
        ));
        let mut sorted: Vec<&AgentWeight> = records.iter().collect();
        sorted.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        for record in sorted {
            output.push_str(&format!(
                "  {:<14} {:>7} {:>8}  {}\n",
                record.agent_id.as_str(),
                Self::weight_text(record.weight),
                record.update_count,
                record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        output
    }

    /// Config file locations followed by validation issues
    pub fn format_config(sources: &[ConfigSource], issues: &[ConfigIssue]) -> String {
        let mut output = Self::section_header("Configuration sources");
        for source in sources {
            let marker = if source.found {
                "found".green()
            } else {
                "missing".dimmed()
            };
            output.push_str(&format!(
                "  {:<10} {} [{}]\n",
                source.label,
                source.path.display(),
                marker
            ));
        }

        output.push_str(&Self::section_header("Validation"));
        if issues.is_empty() {
            output.push_str(&format!("  {}\n", "no issues".green()));
        }
        for issue in issues {
            let tag = if issue.is_error() {
                "error".red().bold()
            } else {
                "warning".yellow()
            };
            output.push_str(&format!("  {}: {}\n", tag, issue.message));
        }
        output
    }

    fn finding_line(scored: &ScoredFinding) -> String {
        let finding = scored.finding();
        let location = finding
            .location()
            .map(|loc| format!("L{}", loc.line))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "  {:<6} {:<16} {} {}\n         {} {}\n",
            location.dimmed(),
            scored.id().as_str().yellow(),
            finding.message(),
            format!("[{}]", finding.kind()).dimmed(),
            "score".dimmed(),
            format!("{:.4}", scored.score()).bold()
        )
    }

    fn severity_label(severity: Severity) -> ColoredString {
        let label = severity.label().to_uppercase();
        match severity.value() {
            5 => label.red().bold(),
            4 => label.red(),
            3 => label.yellow(),
            2 => label.blue(),
            _ => label.dimmed(),
        }
    }

    fn status_text(status: &AgentStatus) -> String {
        match status {
            AgentStatus::Completed {
                findings,
                elapsed_ms,
            } => format!(
                "{} {} findings in {}ms",
                "v".green(),
                findings,
                elapsed_ms
            ),
            AgentStatus::TimedOut { after_ms } => {
                format!("{} timed out after {}ms", "!".yellow(), after_ms)
            }
            AgentStatus::Failed { error } => format!("{} failed: {}", "x".red(), error),
        }
    }

    fn weight_text(weight: f64) -> ColoredString {
        let text = format!("{:.3}", weight);
        if weight > 1.0 {
            text.green()
        } else if weight < 1.0 {
            text.red()
        } else {
            text.normal()
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
