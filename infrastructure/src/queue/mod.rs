//! Feedback queue and applied-feedback ledger adapters
//!
//! The in-memory pair serves tests and single-process runs; the SQLite pair
//! shares one database file so `feedback` and `worker` can run as separate
//! processes.

mod database;
mod ledger;
mod memory;
mod sqlite;
mod sqlite_ledger;

pub use database::DatabaseError;
pub use ledger::{DEFAULT_CLAIM_TIMEOUT, DEFAULT_RETENTION, InMemoryFeedbackLedger};
pub use memory::{DEFAULT_VISIBILITY_TIMEOUT, DeadLetter, InMemoryFeedbackQueue};
pub use sqlite::{DEFAULT_POLL_INTERVAL, SqliteFeedbackQueue};
pub use sqlite_ledger::SqliteFeedbackLedger;
