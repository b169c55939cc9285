//! Submit Feedback use case
//!
//! Accepts a user's accept/reject judgement on one finding and hands it to
//! the feedback queue. Nothing here touches the weight store; the worker
//! applies the update asynchronously. An acknowledgment means the event is
//! durably enqueued, so enqueue failures are surfaced instead of swallowed.

use crate::ports::feedback_queue::FeedbackQueue;
use crate::telemetry;
use chrono::{DateTime, Utc};
use council_domain::{FeedbackEvent, FeedbackValidationError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Upper bound on one enqueue call
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that can occur when submitting feedback
#[derive(Error, Debug)]
pub enum SubmitFeedbackError {
    #[error("Invalid feedback: {0}")]
    Invalid(#[from] FeedbackValidationError),

    #[error("Feedback could not be enqueued: {0}")]
    QueueUnavailable(String),

    #[error("Feedback could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Input for the SubmitFeedback use case
#[derive(Debug, Clone)]
pub struct SubmitFeedbackInput {
    pub analysis_id: String,
    pub finding_id: String,
    pub agent_id: String,
    pub accepted: bool,
    /// 1..=5
    pub rating: u8,
}

impl SubmitFeedbackInput {
    pub fn accept(
        analysis_id: impl Into<String>,
        finding_id: impl Into<String>,
        agent_id: impl Into<String>,
        rating: u8,
    ) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            finding_id: finding_id.into(),
            agent_id: agent_id.into(),
            accepted: true,
            rating,
        }
    }

    pub fn reject(
        analysis_id: impl Into<String>,
        finding_id: impl Into<String>,
        agent_id: impl Into<String>,
        rating: u8,
    ) -> Self {
        Self {
            accepted: false,
            ..Self::accept(analysis_id, finding_id, agent_id, rating)
        }
    }
}

/// Acknowledgment returned once the event is on the queue
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackAck {
    pub message_id: String,
    pub event: FeedbackEvent,
}

impl FeedbackAck {
    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.event.enqueued_at
    }
}

/// Use case for submitting feedback
pub struct SubmitFeedbackUseCase {
    queue: Arc<dyn FeedbackQueue>,
    enqueue_timeout: Duration,
}

impl SubmitFeedbackUseCase {
    pub fn new(queue: Arc<dyn FeedbackQueue>) -> Self {
        Self {
            queue,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
        }
    }

    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout = timeout;
        self
    }

    pub async fn execute(
        &self,
        input: SubmitFeedbackInput,
    ) -> Result<FeedbackAck, SubmitFeedbackError> {
        let event = FeedbackEvent::new(
            input.analysis_id,
            input.finding_id,
            input.agent_id,
            input.accepted,
            input.rating,
        )?;
        let body = serde_json::to_string(&event)?;

        let message_id = match tokio::time::timeout(self.enqueue_timeout, self.queue.send(body))
            .await
        {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                warn!("Failed to enqueue feedback: {}", e);
                return Err(SubmitFeedbackError::QueueUnavailable(e.to_string()));
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.enqueue_timeout.as_millis() as u64,
                    "Enqueue timed out"
                );
                return Err(SubmitFeedbackError::QueueUnavailable(
                    "enqueue timed out".to_string(),
                ));
            }
        };

        telemetry::feedback_queued();
        info!(
            message_id = %message_id,
            analysis_id = %event.analysis_id,
            agent = %event.agent_id,
            accepted = event.accepted,
            rating = event.rating,
            "Feedback enqueued"
        );

        Ok(FeedbackAck { message_id, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::feedback_queue::{
        DeadLetterReason, Delivery, QueueDepth, QueueError, Receipt,
    };
    use crate::telemetry::testing::CapturingRecorder;
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Mode {
        Accept,
        Down,
        Hang,
    }

    struct RecordingQueue {
        mode: Mode,
        sent: Mutex<Vec<String>>,
    }

    impl RecordingQueue {
        fn new(mode: Mode) -> Self {
            Self {
                mode,
                sent: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl FeedbackQueue for RecordingQueue {
        async fn send(&self, body: String) -> Result<String, QueueError> {
            match self.mode {
                Mode::Accept => {
                    let mut sent = self.sent.lock().unwrap();
                    sent.push(body);
                    Ok(format!("msg-{}", sent.len()))
                }
                Mode::Down => Err(QueueError::Unavailable("broker down".to_string())),
                Mode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("never".to_string())
                }
            }
        }

        async fn receive(&self, _max: usize, _wait: Duration) -> Result<Vec<Delivery>, QueueError> {
            Ok(vec![])
        }

        async fn ack(&self, _receipt: &Receipt) -> Result<(), QueueError> {
            Ok(())
        }

        async fn dead_letter(
            &self,
            _delivery: &Delivery,
            _reason: &DeadLetterReason,
        ) -> Result<(), QueueError> {
            Ok(())
        }

        async fn depth(&self) -> Result<QueueDepth, QueueError> {
            Ok(QueueDepth::default())
        }
    }

    #[tokio::test]
    async fn test_enqueues_serialized_event() {
        let queue = Arc::new(RecordingQueue::new(Mode::Accept));
        let uc = SubmitFeedbackUseCase::new(queue.clone());

        let ack = uc
            .execute(SubmitFeedbackInput::accept("an-1", "style-0", "style", 4))
            .await
            .unwrap();

        assert_eq!(ack.message_id, "msg-1");
        let sent = queue.sent.lock().unwrap();
        let decoded: FeedbackEvent = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(decoded.agent_id.as_str(), "style");
        assert!(decoded.accepted);
        assert_eq!(decoded.rating, 4);
    }

    #[tokio::test]
    async fn test_invalid_feedback_is_not_enqueued() {
        let queue = Arc::new(RecordingQueue::new(Mode::Accept));
        let uc = SubmitFeedbackUseCase::new(queue.clone());

        let result = uc
            .execute(SubmitFeedbackInput::reject("an-1", "style-0", "style", 9))
            .await;

        assert!(matches!(
            result,
            Err(SubmitFeedbackError::Invalid(
                FeedbackValidationError::RatingOutOfRange(9)
            ))
        ));
        assert!(queue.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queue_outage_is_surfaced() {
        let uc = SubmitFeedbackUseCase::new(Arc::new(RecordingQueue::new(Mode::Down)));
        let result = uc
            .execute(SubmitFeedbackInput::accept("an-1", "style-0", "style", 3))
            .await;
        assert!(matches!(result, Err(SubmitFeedbackError::QueueUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_timeout() {
        let uc = SubmitFeedbackUseCase::new(Arc::new(RecordingQueue::new(Mode::Hang)))
            .with_enqueue_timeout(Duration::from_millis(100));
        let result = uc
            .execute(SubmitFeedbackInput::accept("an-1", "style-0", "style", 3))
            .await;
        assert!(matches!(
            result,
            Err(SubmitFeedbackError::QueueUnavailable(msg)) if msg.contains("timed out")
        ));
    }

    #[test]
    fn test_only_enqueued_feedback_is_counted() {
        let recorder = CapturingRecorder::default();
        recorder.capture(async {
            let up = SubmitFeedbackUseCase::new(Arc::new(RecordingQueue::new(Mode::Accept)));
            let down = SubmitFeedbackUseCase::new(Arc::new(RecordingQueue::new(Mode::Down)));
            let input = SubmitFeedbackInput::accept("an-1", "style-0", "style", 3);

            up.execute(input.clone()).await.unwrap();
            assert!(down.execute(input).await.is_err());
        });

        assert_eq!(recorder.counter("council_feedback_queued_total"), 1);
    }
}
