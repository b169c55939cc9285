//! Feedback queue port
//!
//! At-least-once message channel between the request path and the feedback
//! worker. A received message stays invisible until it is acknowledged or
//! its visibility timeout lapses, after which it is delivered again with a
//! higher receive count. Messages that cannot be processed go to a
//! dead-letter destination instead of blocking the queue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    #[error("Queue operation timed out")]
    Timeout,

    #[error("Unknown or expired receipt: {0}")]
    UnknownReceipt(String),
}

impl QueueError {
    pub fn is_transient(&self) -> bool {
        matches!(self, QueueError::Unavailable(_) | QueueError::Timeout)
    }
}

/// Handle proving a message is currently leased to one consumer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Receipt(pub String);

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One delivery of one message
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message_id: String,
    pub receipt: Receipt,
    /// Raw message body; decoding is the consumer's job
    pub body: String,
    /// 1 on first delivery, incremented on each redelivery
    pub receive_count: u32,
}

/// Why a message was moved to the dead-letter destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeadLetterReason {
    /// Body could not be decoded
    Malformed { detail: String },
    /// Body decoded but failed validation
    Invalid { detail: String },
    /// The same judgement was already applied
    Duplicate,
    /// Processing kept failing
    RetriesExhausted { attempts: u32 },
}

impl DeadLetterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadLetterReason::Malformed { .. } => "malformed",
            DeadLetterReason::Invalid { .. } => "invalid",
            DeadLetterReason::Duplicate => "duplicate",
            DeadLetterReason::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

impl fmt::Display for DeadLetterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadLetterReason::Malformed { detail } | DeadLetterReason::Invalid { detail } => {
                write!(f, "{}: {}", self.as_str(), detail)
            }
            DeadLetterReason::Duplicate => f.write_str("duplicate"),
            DeadLetterReason::RetriesExhausted { attempts } => {
                write!(f, "retries_exhausted after {} attempts", attempts)
            }
        }
    }
}

/// Message counts by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueDepth {
    pub ready: usize,
    pub in_flight: usize,
    pub dead_lettered: usize,
}

impl QueueDepth {
    /// Nothing waiting and nothing leased
    pub fn is_drained(&self) -> bool {
        self.ready == 0 && self.in_flight == 0
    }
}

#[async_trait]
pub trait FeedbackQueue: Send + Sync {
    /// Enqueue a message body, returning its message id
    async fn send(&self, body: String) -> Result<String, QueueError>;

    /// Lease up to `max` messages, waiting up to `wait` for the first one
    async fn receive(&self, max: usize, wait: Duration) -> Result<Vec<Delivery>, QueueError>;

    /// Delete a leased message after it was fully processed
    async fn ack(&self, receipt: &Receipt) -> Result<(), QueueError>;

    /// Move a leased message to the dead-letter destination
    async fn dead_letter(
        &self,
        delivery: &Delivery,
        reason: &DeadLetterReason,
    ) -> Result<(), QueueError>;

    async fn depth(&self) -> Result<QueueDepth, QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_letter_reason_display() {
        assert_eq!(DeadLetterReason::Duplicate.to_string(), "duplicate");
        assert_eq!(
            DeadLetterReason::Invalid {
                detail: "rating 9 outside 1..=5".to_string()
            }
            .to_string(),
            "invalid: rating 9 outside 1..=5"
        );
        assert_eq!(
            DeadLetterReason::RetriesExhausted { attempts: 5 }.to_string(),
            "retries_exhausted after 5 attempts"
        );
    }

    #[test]
    fn test_queue_error_transience() {
        assert!(QueueError::Timeout.is_transient());
        assert!(QueueError::Unavailable("down".to_string()).is_transient());
        assert!(!QueueError::UnknownReceipt("r".to_string()).is_transient());
    }

    #[test]
    fn test_depth_drained() {
        assert!(QueueDepth::default().is_drained());
        assert!(
            QueueDepth {
                dead_lettered: 3,
                ..Default::default()
            }
            .is_drained()
        );
        assert!(
            !QueueDepth {
                in_flight: 1,
                ..Default::default()
            }
            .is_drained()
        );
    }
}
