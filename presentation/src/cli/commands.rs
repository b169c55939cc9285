//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Findings grouped by severity, with per-agent status
    Full,
    /// The complete result as JSON
    Json,
}

/// CLI arguments for codecouncil
#[derive(Parser, Debug)]
#[command(name = "codecouncil")]
#[command(author, version, about = "Code review council - several advisory agents, one weighted verdict")]
#[command(long_about = r#"
codecouncil sends a code sample to a panel of independent advisory agents,
merges their findings using per-agent trust weights, and adjusts those weights
from your accept/reject feedback.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (nested keys split on __)
2. --config <path>       Explicit config file
3. ./council.toml        Project-level config
4. ~/.config/codecouncil/config.toml   Global config

Example:
  codecouncil analyze src/app.py
  codecouncil analyze lib.rs --output json
  codecouncil feedback --analysis-id <ID> --finding-id security-0 --agent security --accept --rating 5
  codecouncil worker            # applies queued feedback until Ctrl-C
  codecouncil worker --drain    # applies what is queued, then exits
  codecouncil weights
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every configured agent over a source file
    Analyze(AnalyzeArgs),

    /// Queue a verdict on a finding from an earlier analysis
    Feedback(FeedbackArgs),

    /// Apply queued feedback to the agent weights
    Worker(WorkerArgs),

    /// Show current agent trust weights
    Weights {
        /// Restore every agent to the neutral weight
        #[arg(long)]
        reset: bool,
    },

    /// Show configuration file locations and validation issues
    Config,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Source file to analyze
    pub file: PathBuf,

    /// Language tag; guessed from the file extension when omitted
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Skip the result cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args, Debug)]
pub struct WorkerArgs {
    /// Exit once the queue is empty instead of polling until Ctrl-C
    #[arg(long)]
    pub drain: bool,
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Analysis id printed by `analyze`
    #[arg(long, value_name = "ID")]
    pub analysis_id: String,

    /// Finding id, e.g. `security-0`
    #[arg(long, value_name = "ID")]
    pub finding_id: String,

    /// Agent that produced the finding
    #[arg(long, value_name = "AGENT")]
    pub agent: String,

    /// The finding was useful
    #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
    pub accept: bool,

    /// The finding was wrong or noise
    #[arg(long)]
    pub reject: bool,

    /// Strength of the verdict, 1 to 5
    #[arg(long, default_value_t = 5)]
    pub rating: u8,
}

impl FeedbackArgs {
    pub fn accepted(&self) -> bool {
        self.accept && !self.reject
    }
}
