//! Append-only JSONL trail of weight changes
//!
//! One line per change:
//!
//! ```json
//! {"ts":"2026-03-02T10:15:04.120Z","pid":4711,"event":"weight_updated",
//!  "analysis_id":"an-1","finding_id":"style-0","agent":"style","accepted":true,
//!  "rating":5,"reward":0.25,"applied_delta":0.25,"before":1.0,"after":1.25,
//!  "clamped":false,"update_count":3,"enqueued_at":"2026-03-02T10:15:03.871Z"}
//! ```
//!
//! Each line goes out in a single `write` on an `O_APPEND` handle, so the
//! worker and a concurrent `weights --reset` never split each other's lines.
//! With [`SyncPolicy::EveryLine`] the line is on disk before the trainer
//! returns, which is before the feedback message is acknowledged.

use chrono::SecondsFormat;
use council_application::{AuditEvent, WeightAuditLog};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// When appended lines are forced to stable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// `fdatasync` after every line
    #[default]
    EveryLine,
    /// Leave lines in the OS page cache
    OsBuffered,
}

#[derive(Serialize)]
struct AuditLine<'a> {
    ts: String,
    pid: u32,
    event: &'static str,
    #[serde(flatten)]
    update: Option<UpdateFields<'a>>,
}

#[derive(Serialize)]
struct UpdateFields<'a> {
    analysis_id: &'a str,
    finding_id: &'a str,
    agent: &'a str,
    accepted: bool,
    rating: u8,
    reward: f64,
    /// What actually moved after clamping
    applied_delta: f64,
    before: f64,
    after: f64,
    clamped: bool,
    update_count: u64,
    enqueued_at: String,
}

fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl<'a> AuditLine<'a> {
    fn from_event(event: &'a AuditEvent) -> Self {
        let update = match event {
            AuditEvent::WeightUpdated {
                feedback,
                reward,
                update,
            } => Some(UpdateFields {
                analysis_id: feedback.analysis_id.as_str(),
                finding_id: feedback.finding_id.as_str(),
                agent: update.agent_id.as_str(),
                accepted: feedback.accepted,
                rating: feedback.rating,
                reward: *reward,
                applied_delta: update.after - update.before,
                before: update.before,
                after: update.after,
                clamped: update.was_clamped(),
                update_count: update.update_count,
                enqueued_at: timestamp(feedback.enqueued_at),
            }),
            AuditEvent::WeightsReset => None,
        };
        Self {
            ts: timestamp(chrono::Utc::now()),
            pid: std::process::id(),
            event: event.kind(),
            update,
        }
    }
}

pub struct JsonlWeightAuditLog {
    file: Mutex<File>,
    path: PathBuf,
    sync: SyncPolicy,
}

impl JsonlWeightAuditLog {
    /// Open the trail for appending, creating it and its directory if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
            sync: SyncPolicy::default(),
        })
    }

    pub fn with_sync_policy(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &[u8]) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("audit log lock poisoned"))?;
        file.write_all(line)?;
        if self.sync == SyncPolicy::EveryLine {
            file.sync_data()?;
        }
        Ok(())
    }
}

impl WeightAuditLog for JsonlWeightAuditLog {
    fn log(&self, event: AuditEvent) {
        let mut line = match serde_json::to_vec(&AuditLine::from_event(&event)) {
            Ok(line) => line,
            Err(e) => {
                warn!(event = event.kind(), error = %e, "Audit line could not be encoded");
                return;
            }
        };
        line.push(b'\n');

        if let Err(e) = self.append(&line) {
            warn!(
                path = %self.path.display(),
                event = event.kind(),
                error = %e,
                "Audit line was not written"
            );
        }
    }
}
