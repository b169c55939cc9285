//! Applied-feedback ledger in the queue's SQLite file
//!
//! Claims are rows in state `claimed`; a claim older than the claim timeout
//! is presumed abandoned by a crashed worker and may be taken over. Applied
//! rows are deleted once they age past the retention window.

use super::database::{DatabaseError, FeedbackDatabase, duration_ms, now_ms};
use super::ledger::{DEFAULT_CLAIM_TIMEOUT, DEFAULT_RETENTION};
use async_trait::async_trait;
use council_application::{FeedbackLedger, LedgerError};
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub struct SqliteFeedbackLedger {
    db: FeedbackDatabase,
    retention: Duration,
    claim_timeout: Duration,
}

impl SqliteFeedbackLedger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        Ok(Self {
            db: FeedbackDatabase::open(path)?,
            retention: DEFAULT_RETENTION,
            claim_timeout: DEFAULT_CLAIM_TIMEOUT,
        })
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_claim_timeout(mut self, timeout: Duration) -> Self {
        self.claim_timeout = timeout;
        self
    }

    /// Keys currently remembered, claimed or applied
    pub async fn len(&self) -> Result<usize, LedgerError> {
        let n: i64 = self
            .db
            .run(|conn| {
                Ok(conn.query_row("SELECT COUNT(1) FROM applied_feedback", [], |row| {
                    row.get(0)
                })?)
            })
            .await?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

#[async_trait]
impl FeedbackLedger for SqliteFeedbackLedger {
    async fn claim(&self, key: &str) -> Result<bool, LedgerError> {
        let key = key.to_string();
        let retention_ms = duration_ms(self.retention);
        let claim_timeout_ms = duration_ms(self.claim_timeout);

        let claimed = self
            .db
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let now = now_ms();
                tx.execute(
                    "DELETE FROM applied_feedback WHERE state = 'applied' AND updated_ms <= ?1",
                    params![now.saturating_sub(retention_ms)],
                )?;

                let existing: Option<(String, i64)> = tx
                    .query_row(
                        "SELECT state, updated_ms FROM applied_feedback WHERE dedup_key = ?1",
                        params![key],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                let take = match existing.as_ref().map(|(state, at)| (state.as_str(), *at)) {
                    Some(("applied", _)) => false,
                    Some(("claimed", at)) => {
                        let stale = now.saturating_sub(at) >= claim_timeout_ms;
                        if stale {
                            debug!(key = %key, "Taking over abandoned claim");
                        }
                        stale
                    }
                    Some((other, _)) => {
                        return Err(DatabaseError::Corrupt(format!(
                            "{key}: unknown ledger state {other}"
                        )));
                    }
                    None => true,
                };

                if take {
                    tx.execute(
                        "INSERT OR REPLACE INTO applied_feedback(dedup_key, state, updated_ms)
                         VALUES (?1, 'claimed', ?2)",
                        params![key, now],
                    )?;
                }
                // Commit either way so the prune sticks
                tx.commit()?;
                Ok(take)
            })
            .await?;
        Ok(claimed)
    }

    async fn commit(&self, key: &str) -> Result<(), LedgerError> {
        let key = key.to_string();
        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO applied_feedback(dedup_key, state, updated_ms)
                     VALUES (?1, 'applied', ?2)
                     ON CONFLICT(dedup_key) DO UPDATE SET state = 'applied', updated_ms = ?2",
                    params![key, now_ms()],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn release(&self, key: &str) -> Result<(), LedgerError> {
        let key = key.to_string();
        self.db
            .run(move |conn| {
                conn.execute(
                    "DELETE FROM applied_feedback WHERE dedup_key = ?1 AND state = 'claimed'",
                    params![key],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "an-1/style-0/style";

    fn ledger_at(dir: &tempfile::TempDir) -> SqliteFeedbackLedger {
        SqliteFeedbackLedger::open(dir.path().join("feedback.sqlite")).unwrap()
    }

    #[tokio::test]
    async fn test_claim_is_exclusive_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let a = ledger_at(&dir);
        let b = ledger_at(&dir);

        assert!(a.claim(KEY).await.unwrap());
        assert!(!b.claim(KEY).await.unwrap());

        a.commit(KEY).await.unwrap();
        assert!(!b.claim(KEY).await.unwrap());
        assert_eq!(b.len().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let ledger = ledger_at(&dir);
            tasks.push(tokio::spawn(async move { ledger.claim(KEY).await.unwrap() }));
        }

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_release_allows_retry_but_not_after_commit() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_at(&dir);

        ledger.claim(KEY).await.unwrap();
        ledger.release(KEY).await.unwrap();
        assert!(ledger.claim(KEY).await.unwrap());

        ledger.commit(KEY).await.unwrap();
        ledger.release(KEY).await.unwrap();
        assert!(!ledger.claim(KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_applied_keys_expire_and_stale_claims_are_taken_over() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_at(&dir)
            .with_retention(Duration::from_millis(50))
            .with_claim_timeout(Duration::from_millis(50));

        ledger.claim("an-old/style-0/style").await.unwrap();
        ledger.commit("an-old/style-0/style").await.unwrap();
        assert!(ledger.claim(KEY).await.unwrap());
        assert!(!ledger.claim(KEY).await.unwrap());

        tokio::time::sleep(Duration::from_millis(80)).await;

        // The stale claim is taken over, the applied key is gone
        assert!(ledger.claim(KEY).await.unwrap());
        assert_eq!(ledger.len().await.unwrap(), 1);
    }
}
