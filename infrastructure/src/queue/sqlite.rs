//! Durable feedback queue in a SQLite file
//!
//! The queue the CLI uses: `feedback` appends, a separate `worker` process
//! leases and acknowledges. A lease is a receipt plus a `visible_at` in the
//! future; once it passes, the row is eligible again and the next receive
//! bumps its receive count. Receivers poll; the file offers no wakeups.

use super::database::{DatabaseError, FeedbackDatabase, duration_ms, now_ms};
use super::memory::{DEFAULT_VISIBILITY_TIMEOUT, DeadLetter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use council_application::{
    DeadLetterReason, Delivery, FeedbackQueue, QueueDepth, QueueError, Receipt,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default pause between polls while waiting for a message
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct SqliteFeedbackQueue {
    db: FeedbackDatabase,
    visibility_timeout: Duration,
    poll_interval: Duration,
}

impl SqliteFeedbackQueue {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let db = FeedbackDatabase::open(path)?;
        info!(path = %db.path().display(), "Opened feedback queue");
        Ok(Self {
            db,
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Everything in the dead-letter table, oldest first
    pub async fn dead_letters(&self) -> Result<Vec<DeadLetter>, QueueError> {
        Ok(self.db.run(read_dead_letters).await?)
    }
}

fn lease_batch(
    conn: &mut Connection,
    max: usize,
    visibility_ms: i64,
) -> Result<Vec<Delivery>, DatabaseError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let now = now_ms();

    let rows: Vec<(i64, String, String, u32)> = {
        let mut stmt = tx.prepare(
            "SELECT seq, id, body, receive_count FROM messages
             WHERE visible_at <= ?1 ORDER BY seq LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![now, max as i64], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        rows.collect::<Result<_, _>>()?
    };

    let mut batch = Vec::with_capacity(rows.len());
    for (seq, message_id, body, receive_count) in rows {
        let receive_count = receive_count.saturating_add(1);
        let receipt = format!("rc-{}", Uuid::new_v4().simple());
        tx.execute(
            "UPDATE messages SET receive_count = ?1, receipt = ?2, visible_at = ?3 WHERE seq = ?4",
            params![receive_count, receipt, now.saturating_add(visibility_ms), seq],
        )?;
        batch.push(Delivery {
            message_id,
            receipt: Receipt(receipt),
            body,
            receive_count,
        });
    }
    tx.commit()?;
    Ok(batch)
}

fn read_dead_letters(conn: &mut Connection) -> Result<Vec<DeadLetter>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT message_id, body, reason, receive_count, dead_lettered_at
         FROM dead_letters ORDER BY dead_lettered_at",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (message_id, body, reason, receive_count, at) = row?;
        let reason: DeadLetterReason = serde_json::from_str(&reason)
            .map_err(|e| DatabaseError::Corrupt(format!("{message_id}: {e}")))?;
        let dead_lettered_at = DateTime::parse_from_rfc3339(&at)
            .map_err(|e| DatabaseError::Corrupt(format!("{message_id}: {e}")))?
            .with_timezone(&Utc);
        out.push(DeadLetter {
            message_id,
            body,
            reason,
            receive_count,
            dead_lettered_at,
        });
    }
    Ok(out)
}

#[async_trait]
impl FeedbackQueue for SqliteFeedbackQueue {
    async fn send(&self, body: String) -> Result<String, QueueError> {
        let id = format!("msg-{}", Uuid::new_v4().simple());
        let row_id = id.clone();
        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO messages(id, body, receive_count, visible_at, created)
                     VALUES (?1, ?2, 0, ?3, ?4)",
                    params![row_id, body, now_ms(), Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await?;

        debug!(message_id = %id, "Message enqueued");
        Ok(id)
    }

    async fn receive(&self, max: usize, wait: Duration) -> Result<Vec<Delivery>, QueueError> {
        let deadline = Instant::now() + wait;
        let max = max.max(1);
        let visibility_ms = duration_ms(self.visibility_timeout);

        loop {
            let batch = self
                .db
                .run(move |conn| lease_batch(conn, max, visibility_ms))
                .await?;
            if !batch.is_empty() {
                return Ok(batch);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(vec![]);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn ack(&self, receipt: &Receipt) -> Result<(), QueueError> {
        let token = receipt.0.clone();
        let deleted = self
            .db
            .run(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM messages WHERE receipt = ?1 AND visible_at > ?2",
                    params![token, now_ms()],
                )?)
            })
            .await?;

        if deleted == 0 {
            return Err(QueueError::UnknownReceipt(receipt.to_string()));
        }
        debug!(receipt = %receipt, "Message acknowledged");
        Ok(())
    }

    async fn dead_letter(
        &self,
        delivery: &Delivery,
        reason: &DeadLetterReason,
    ) -> Result<(), QueueError> {
        let reason_json = serde_json::to_string(reason)
            .map_err(|e| QueueError::Unavailable(format!("cannot encode reason: {e}")))?;
        let token = delivery.receipt.0.clone();

        let moved = self
            .db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let leased: Option<(i64, String, String, u32)> = tx
                    .query_row(
                        "SELECT seq, id, body, receive_count FROM messages
                         WHERE receipt = ?1 AND visible_at > ?2",
                        params![token, now_ms()],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                    )
                    .optional()?;
                let Some((seq, message_id, body, receive_count)) = leased else {
                    return Ok(false);
                };

                tx.execute(
                    "INSERT OR REPLACE INTO dead_letters(message_id, body, reason, receive_count, dead_lettered_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![message_id, body, reason_json, receive_count, Utc::now().to_rfc3339()],
                )?;
                tx.execute("DELETE FROM messages WHERE seq = ?1", params![seq])?;
                tx.commit()?;
                Ok(true)
            })
            .await?;

        if !moved {
            return Err(QueueError::UnknownReceipt(delivery.receipt.to_string()));
        }
        warn!(
            message_id = %delivery.message_id,
            reason = reason.as_str(),
            "Message dead-lettered"
        );
        Ok(())
    }

    async fn depth(&self) -> Result<QueueDepth, QueueError> {
        let (ready, in_flight, dead) = self
            .db
            .run(|conn| {
                let now = now_ms();
                let count = |sql: &str, args: &[&dyn rusqlite::ToSql]| -> rusqlite::Result<i64> {
                    conn.query_row(sql, args, |row| row.get(0))
                };
                Ok((
                    count("SELECT COUNT(1) FROM messages WHERE visible_at <= ?1", &[&now])?,
                    count("SELECT COUNT(1) FROM messages WHERE visible_at > ?1", &[&now])?,
                    count("SELECT COUNT(1) FROM dead_letters", &[])?,
                ))
            })
            .await?;

        let to_usize = |n: i64| usize::try_from(n).unwrap_or(0);
        Ok(QueueDepth {
            ready: to_usize(ready),
            in_flight: to_usize(in_flight),
            dead_lettered: to_usize(dead),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::SqliteFeedbackLedger;
    use crate::weights::FileWeightStore;
    use council_application::{
        FeedbackProcessor, RlTrainer, SubmitFeedbackInput, SubmitFeedbackUseCase, WeightStore,
        WorkerParams,
    };
    use council_domain::AgentId;
    use std::sync::Arc;

    fn queue_at(dir: &tempfile::TempDir) -> SqliteFeedbackQueue {
        SqliteFeedbackQueue::open(dir.path().join("feedback.sqlite"))
            .unwrap()
            .with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_message_crosses_queue_handles() {
        let dir = tempfile::tempdir().unwrap();
        let producer = queue_at(&dir);
        let consumer = queue_at(&dir);

        let id = producer.send("hello".to_string()).await.unwrap();
        let batch = consumer.receive(10, Duration::ZERO).await.unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].message_id, id);
        assert_eq!(batch[0].body, "hello");
        assert_eq!(batch[0].receive_count, 1);
        assert_eq!(producer.depth().await.unwrap().in_flight, 1);

        consumer.ack(&batch[0].receipt).await.unwrap();
        assert!(producer.depth().await.unwrap().is_drained());
        assert!(matches!(
            consumer.ack(&batch[0].receipt).await,
            Err(QueueError::UnknownReceipt(_))
        ));
    }

    #[tokio::test]
    async fn test_fifo_batches() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_at(&dir);
        for i in 0..5 {
            queue.send(format!("m{i}")).await.unwrap();
        }

        let first = queue.receive(3, Duration::ZERO).await.unwrap();
        let second = queue.receive(3, Duration::ZERO).await.unwrap();

        let bodies: Vec<&str> = first.iter().chain(&second).map(|d| d.body.as_str()).collect();
        assert_eq!(bodies, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_expired_lease_is_redelivered() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_at(&dir).with_visibility_timeout(Duration::from_millis(50));
        queue.send("payload".to_string()).await.unwrap();

        let first = queue.receive(1, Duration::ZERO).await.unwrap();
        assert!(queue.receive(1, Duration::ZERO).await.unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(80)).await;
        let second = queue.receive(1, Duration::ZERO).await.unwrap();

        assert_eq!(second[0].message_id, first[0].message_id);
        assert_eq!(second[0].receive_count, 2);
        assert!(queue.ack(&first[0].receipt).await.is_err());
        queue.ack(&second[0].receipt).await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_waits_for_send() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_at(&dir);
        let sender = queue_at(&dir);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            sender.send("late".to_string()).await.unwrap();
        });

        let batch = queue.receive(10, Duration::from_secs(5)).await.unwrap();
        assert_eq!(batch[0].body, "late");
    }

    #[tokio::test]
    async fn test_dead_letters_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_at(&dir);
        queue.send("junk".to_string()).await.unwrap();
        let batch = queue.receive(1, Duration::ZERO).await.unwrap();
        queue
            .dead_letter(
                &batch[0],
                &DeadLetterReason::Malformed {
                    detail: "expected value".to_string(),
                },
            )
            .await
            .unwrap();
        drop(queue);

        let reopened = queue_at(&dir);
        let depth = reopened.depth().await.unwrap();
        assert!(depth.is_drained());
        assert_eq!(depth.dead_lettered, 1);

        let dead = reopened.dead_letters().await.unwrap();
        assert_eq!(dead[0].body, "junk");
        assert_eq!(dead[0].receive_count, 1);
        assert!(matches!(dead[0].reason, DeadLetterReason::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_submit_then_separate_worker_applies_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("feedback.sqlite");
        let weights = dir.path().join("weights.json");

        // Request side: only enqueues
        let submit = SubmitFeedbackUseCase::new(Arc::new(SqliteFeedbackQueue::open(&db).unwrap()));
        let input = SubmitFeedbackInput::accept("an-1", "style-0", "style", 5);
        submit.execute(input.clone()).await.unwrap();
        submit.execute(input).await.unwrap();

        // Worker side: its own handles on the same files
        let store = Arc::new(FileWeightStore::open(&weights).await.unwrap());
        let processor = FeedbackProcessor::new(
            Arc::new(queue_at(&dir)),
            RlTrainer::new(store.clone()),
            Arc::new(SqliteFeedbackLedger::open(&db).unwrap()),
        )
        .with_params(WorkerParams::default().with_wait(Duration::ZERO));
        let stats = processor.drain().await;

        assert_eq!(stats.applied, 1);
        assert_eq!(stats.dead_lettered, 1);
        let weight = store.get_all().await.unwrap().weight(&AgentId::new("style"));
        assert_eq!(weight, 1.25);

        let dead = queue_at(&dir).dead_letters().await.unwrap();
        assert_eq!(dead[0].reason, DeadLetterReason::Duplicate);
    }
}
