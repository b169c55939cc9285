//! Presentation layer for codecouncil
//!
//! This crate contains the CLI definition, console and JSON output
//! formatters, and dispatch progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{AnalyzeArgs, Cli, Command, FeedbackArgs, OutputFormat, WorkerArgs};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
