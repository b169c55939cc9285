//! SQLite file shared by the durable queue and ledger
//!
//! Every call opens its own connection on a blocking thread; SQLite's file
//! locking (WAL mode plus a busy timeout) serializes writers across threads
//! and processes.

use council_application::{LedgerError, QueueError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("blocking task failed: {0}")]
    Join(String),

    #[error("stored row is corrupt: {0}")]
    Corrupt(String),
}

impl From<DatabaseError> for QueueError {
    fn from(e: DatabaseError) -> Self {
        QueueError::Unavailable(e.to_string())
    }
}

impl From<DatabaseError> for LedgerError {
    fn from(e: DatabaseError) -> Self {
        LedgerError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FeedbackDatabase {
    path: PathBuf,
}

impl FeedbackDatabase {
    /// Create the file and schema if needed
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = connect(&path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        init_schema(&conn)?;

        debug!(path = %path.display(), "Opened feedback database");
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` on a fresh connection off the async executor
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = connect(&path)?;
            op(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::Join(e.to_string()))?
    }
}

fn connect(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          id TEXT NOT NULL UNIQUE,
          body TEXT NOT NULL,
          receive_count INTEGER NOT NULL DEFAULT 0,
          receipt TEXT,
          visible_at INTEGER NOT NULL,  -- unix ms; leased while in the future
          created TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_messages_visible ON messages(visible_at);
        CREATE INDEX IF NOT EXISTS idx_messages_receipt ON messages(receipt);

        CREATE TABLE IF NOT EXISTS dead_letters (
          message_id TEXT PRIMARY KEY,
          body TEXT NOT NULL,
          reason TEXT NOT NULL,         -- JSON DeadLetterReason
          receive_count INTEGER NOT NULL,
          dead_lettered_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS applied_feedback (
          dedup_key TEXT PRIMARY KEY,
          state TEXT NOT NULL,          -- claimed | applied
          updated_ms INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_applied_updated ON applied_feedback(state, updated_ms);
        "#,
    )?;
    Ok(())
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
