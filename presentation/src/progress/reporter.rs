//! Progress reporting for agent dispatch

use colored::Colorize;
use council_application::DispatchProgress;
use council_domain::{AgentId, AgentStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports agents finishing on a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn status_mark(agent: &AgentId, status: &AgentStatus) -> String {
        match status {
            AgentStatus::Completed { .. } => format!("{} {}", "v".green(), agent),
            AgentStatus::TimedOut { .. } => format!("{} {} (timed out)", "!".yellow(), agent),
            AgentStatus::Failed { .. } => format!("{} {} (failed)", "x".red(), agent),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchProgress for ProgressReporter {
    fn on_dispatch_start(&self, total_agents: usize) {
        let pb = ProgressBar::new(total_agents as u64);
        pb.set_style(Self::bar_style());
        pb.set_prefix("Agents");
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_agent_complete(&self, agent: &AgentId, status: &AgentStatus) {
        if let Ok(slot) = self.bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::status_mark(agent, status));
            pb.inc(1);
        }
    }

    fn on_dispatch_complete(&self) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{}", "done".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DispatchProgress for SimpleProgress {
    fn on_dispatch_start(&self, total_agents: usize) {
        eprintln!("{} {} ({} agents)", "->".cyan(), "Dispatching".bold(), total_agents);
    }

    fn on_agent_complete(&self, agent: &AgentId, status: &AgentStatus) {
        eprintln!("  {}", ProgressReporter::status_mark(agent, status));
    }

    fn on_dispatch_complete(&self) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_tolerates_events_without_start() {
        let reporter = ProgressReporter::new();
        reporter.on_agent_complete(&AgentId::new("style"), &AgentStatus::TimedOut { after_ms: 5 });
        reporter.on_dispatch_complete();
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_reporter_counts_agents() {
        let reporter = ProgressReporter::new();
        reporter.on_dispatch_start(2);
        reporter.on_agent_complete(
            &AgentId::new("style"),
            &AgentStatus::Completed {
                findings: 1,
                elapsed_ms: 3,
            },
        );
        let position = reporter.bar.lock().unwrap().as_ref().map(|pb| pb.position());
        assert_eq!(position, Some(1));

        reporter.on_dispatch_complete();
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_status_marks() {
        colored::control::set_override(false);
        let agent = AgentId::new("remote");
        assert_eq!(
            ProgressReporter::status_mark(&agent, &AgentStatus::Failed { error: "boom".into() }),
            "x remote (failed)"
        );
    }
}
