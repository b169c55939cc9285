//! Feedback processor (worker)
//!
//! Consumes the feedback queue and drives each delivery through
//! `Received → Validated → RewardComputed → WeightUpdated → Acknowledged`,
//! or to `DeadLettered`. The queue is at-least-once, so the message is
//! acknowledged only after the weight update committed; a crash in between
//! means redelivery, and the applied-feedback ledger turns that redelivery
//! into a dead-lettered duplicate instead of a second update. The ledger
//! claim is taken before the update, so concurrent workers holding copies
//! of one message apply it once between them.

use super::train_weights::RlTrainer;
use crate::config::WorkerParams;
use crate::telemetry;
use crate::ports::feedback_ledger::FeedbackLedger;
use crate::ports::feedback_queue::{DeadLetterReason, Delivery, FeedbackQueue};
use council_domain::{FeedbackEvent, WeightUpdate};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle stage of one feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStage {
    Received,
    Validated,
    RewardComputed,
    WeightUpdated,
    Acknowledged,
    DeadLettered,
}

impl fmt::Display for FeedbackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedbackStage::Received => "received",
            FeedbackStage::Validated => "validated",
            FeedbackStage::RewardComputed => "reward_computed",
            FeedbackStage::WeightUpdated => "weight_updated",
            FeedbackStage::Acknowledged => "acknowledged",
            FeedbackStage::DeadLettered => "dead_lettered",
        };
        f.write_str(s)
    }
}

/// Where one delivery ended up
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Weight updated and message acknowledged
    Applied { reward: f64, update: WeightUpdate },
    /// Message moved to the dead-letter destination
    DeadLettered(DeadLetterReason),
    /// Left unacknowledged; the queue will redeliver it
    Deferred { stage: FeedbackStage, error: String },
}

impl ProcessOutcome {
    /// Final stage reached by the message on this delivery
    pub fn stage(&self) -> FeedbackStage {
        match self {
            ProcessOutcome::Applied { .. } => FeedbackStage::Acknowledged,
            ProcessOutcome::DeadLettered(_) => FeedbackStage::DeadLettered,
            ProcessOutcome::Deferred { stage, .. } => *stage,
        }
    }
}

/// Counters for one worker run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub applied: usize,
    pub dead_lettered: usize,
    pub deferred: usize,
}

impl WorkerStats {
    fn record(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Applied { .. } => self.applied += 1,
            ProcessOutcome::DeadLettered(_) => self.dead_lettered += 1,
            ProcessOutcome::Deferred { .. } => self.deferred += 1,
        }
    }

    fn merge(&mut self, other: WorkerStats) {
        self.applied += other.applied;
        self.dead_lettered += other.dead_lettered;
        self.deferred += other.deferred;
    }

    pub fn total(&self) -> usize {
        self.applied + self.dead_lettered + self.deferred
    }
}

/// The feedback worker
pub struct FeedbackProcessor {
    queue: Arc<dyn FeedbackQueue>,
    trainer: RlTrainer,
    ledger: Arc<dyn FeedbackLedger>,
    params: WorkerParams,
}

impl FeedbackProcessor {
    pub fn new(
        queue: Arc<dyn FeedbackQueue>,
        trainer: RlTrainer,
        ledger: Arc<dyn FeedbackLedger>,
    ) -> Self {
        Self {
            queue,
            trainer,
            ledger,
            params: WorkerParams::default(),
        }
    }

    pub fn with_params(mut self, params: WorkerParams) -> Self {
        self.params = params;
        self
    }

    /// Drive one delivery to a final state for this attempt
    pub async fn process(&self, delivery: &Delivery) -> ProcessOutcome {
        let outcome = self.process_delivery(delivery).await;
        telemetry::feedback_processed(&outcome);
        outcome
    }

    async fn process_delivery(&self, delivery: &Delivery) -> ProcessOutcome {
        debug!(
            message_id = %delivery.message_id,
            receive_count = delivery.receive_count,
            stage = %FeedbackStage::Received,
            "Processing feedback"
        );

        let event = match serde_json::from_str::<FeedbackEvent>(&delivery.body) {
            Ok(event) => event.with_attempt(delivery.receive_count),
            Err(e) => {
                return self
                    .dead_letter(
                        delivery,
                        DeadLetterReason::Malformed {
                            detail: e.to_string(),
                        },
                    )
                    .await;
            }
        };

        if let Err(e) = event.validate() {
            return self
                .dead_letter(
                    delivery,
                    DeadLetterReason::Invalid {
                        detail: e.to_string(),
                    },
                )
                .await;
        }

        if delivery.receive_count > self.params.max_attempts {
            return self
                .dead_letter(
                    delivery,
                    DeadLetterReason::RetriesExhausted {
                        attempts: delivery.receive_count.saturating_sub(1),
                    },
                )
                .await;
        }

        let key = event.dedup_key();
        match self.ledger.claim(&key).await {
            Ok(true) => {}
            Ok(false) => return self.dead_letter(delivery, DeadLetterReason::Duplicate).await,
            Err(e) => {
                warn!(message_id = %delivery.message_id, "Cannot claim feedback: {}", e);
                return ProcessOutcome::Deferred {
                    stage: FeedbackStage::Validated,
                    error: e.to_string(),
                };
            }
        }
        debug!(message_id = %delivery.message_id, stage = %FeedbackStage::Validated);

        let step = match self.trainer.train(&event).await {
            Ok(step) => step,
            Err(e) => {
                if e.is_transient() {
                    warn!(
                        message_id = %delivery.message_id,
                        attempt = event.attempt,
                        "Weight update failed, leaving message for redelivery: {}", e
                    );
                } else {
                    error!(
                        message_id = %delivery.message_id,
                        attempt = event.attempt,
                        "Weight update failed: {}", e
                    );
                }
                if let Err(release) = self.ledger.release(&key).await {
                    warn!(message_id = %delivery.message_id, "Failed to release claim: {}", release);
                }
                return ProcessOutcome::Deferred {
                    stage: FeedbackStage::RewardComputed,
                    error: e.to_string(),
                };
            }
        };

        // The update is committed. If the ledger write fails, the claim still
        // blocks redeliveries until the claim timeout.
        if let Err(e) = self.ledger.commit(&key).await {
            error!(message_id = %delivery.message_id, "Failed to record applied feedback: {}", e);
        }
        debug!(message_id = %delivery.message_id, stage = %FeedbackStage::WeightUpdated);

        if let Err(e) = self.queue.ack(&delivery.receipt).await {
            warn!(message_id = %delivery.message_id, "Failed to acknowledge message: {}", e);
        }

        ProcessOutcome::Applied {
            reward: step.reward,
            update: step.update,
        }
    }

    async fn dead_letter(&self, delivery: &Delivery, reason: DeadLetterReason) -> ProcessOutcome {
        warn!(
            message_id = %delivery.message_id,
            reason = reason.as_str(),
            "Dead-lettering feedback: {}", reason
        );
        match self.queue.dead_letter(delivery, &reason).await {
            Ok(()) => ProcessOutcome::DeadLettered(reason),
            Err(e) => {
                warn!(message_id = %delivery.message_id, "Dead-lettering failed: {}", e);
                ProcessOutcome::Deferred {
                    stage: FeedbackStage::Received,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Receive one batch and process it, returning `None` on receive failure
    async fn poll_once(&self) -> Option<WorkerStats> {
        match self
            .queue
            .receive(self.params.batch_size, self.params.wait)
            .await
        {
            Ok(batch) => {
                let mut stats = WorkerStats::default();
                for delivery in &batch {
                    stats.record(&self.process(delivery).await);
                }
                Some(stats)
            }
            Err(e) => {
                warn!("Receive failed: {}", e);
                None
            }
        }
    }

    /// Poll until `cancel` fires
    ///
    /// Receive failures back off exponentially up to `max_backoff`.
    /// Cancellation is observed between batches, so the batch in hand is
    /// always finished first.
    pub async fn run(&self, cancel: CancellationToken) -> WorkerStats {
        info!(
            batch_size = self.params.batch_size,
            max_attempts = self.params.max_attempts,
            "Feedback worker started"
        );

        let mut stats = WorkerStats::default();
        let mut failures = 0u32;

        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                polled = self.poll_once() => polled,
            };

            match polled {
                Some(batch) => {
                    failures = 0;
                    stats.merge(batch);
                }
                None => {
                    failures = failures.saturating_add(1);
                    let backoff = self.params.backoff_for(failures);
                    debug!(failures, backoff_ms = backoff.as_millis() as u64, "Backing off");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        info!(
            applied = stats.applied,
            dead_lettered = stats.dead_lettered,
            deferred = stats.deferred,
            "Feedback worker stopped"
        );
        stats
    }

    /// Run the worker on its own task
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<WorkerStats> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Process batches until a receive comes back empty
    ///
    /// For one-shot use (e.g. the CLI), where no long-running worker exists.
    pub async fn drain(&self) -> WorkerStats {
        let mut stats = WorkerStats::default();
        while let Some(batch) = self.poll_once().await {
            if batch.total() == 0 {
                break;
            }
            stats.merge(batch);
        }
        stats
    }
}
