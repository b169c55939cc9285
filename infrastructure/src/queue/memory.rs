//! In-memory feedback queue
//!
//! Single-process stand-in for a managed at-least-once queue. Received
//! messages are leased under a visibility timeout; a lease that is neither
//! acknowledged nor dead-lettered in time puts the message back at the front
//! of the queue with its receive count intact, so the next delivery reports
//! a higher count. Expired leases are reclaimed lazily whenever the queue is
//! touched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use council_application::{
    DeadLetterReason, Delivery, FeedbackQueue, QueueDepth, QueueError, Receipt,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default time a received message stays invisible
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct Message {
    id: String,
    body: String,
    receive_count: u32,
}

/// A message parked in the dead-letter destination
#[derive(Debug, Clone, PartialEq)]
pub struct DeadLetter {
    pub message_id: String,
    pub body: String,
    pub reason: DeadLetterReason,
    pub receive_count: u32,
    pub dead_lettered_at: DateTime<Utc>,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<Message>,
    in_flight: HashMap<Receipt, (Message, Instant)>,
    dead: Vec<DeadLetter>,
}

impl QueueState {
    /// Return expired leases to the front of the queue
    fn reclaim_expired(&mut self, now: Instant) {
        let expired: Vec<Receipt> = self
            .in_flight
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();

        for receipt in expired {
            if let Some((message, _)) = self.in_flight.remove(&receipt) {
                debug!(message_id = %message.id, "Lease expired, message visible again");
                self.ready.push_front(message);
            }
        }
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.in_flight.values().map(|(_, at)| *at).min()
    }
}

pub struct InMemoryFeedbackQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    visibility_timeout: Duration,
    closed: AtomicBool,
}

impl Default for InMemoryFeedbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFeedbackQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    /// Stop accepting messages and wake any waiting receivers
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
        info!("Feedback queue closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of the dead-letter destination
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.state.lock().await.dead.clone()
    }
}

#[async_trait]
impl FeedbackQueue for InMemoryFeedbackQueue {
    async fn send(&self, body: String) -> Result<String, QueueError> {
        if self.is_closed() {
            return Err(QueueError::Unavailable("queue is closed".to_string()));
        }

        let id = format!("msg-{}", Uuid::new_v4().simple());
        self.state.lock().await.ready.push_back(Message {
            id: id.clone(),
            body,
            receive_count: 0,
        });
        self.notify.notify_waiters();

        debug!(message_id = %id, "Message enqueued");
        Ok(id)
    }

    async fn receive(&self, max: usize, wait: Duration) -> Result<Vec<Delivery>, QueueError> {
        let deadline = Instant::now() + wait;

        loop {
            // Register before checking so a send in between is not missed
            let notified = self.notify.notified();

            let wake_at = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                state.reclaim_expired(now);

                if !state.ready.is_empty() {
                    let take = max.max(1).min(state.ready.len());
                    let expires_at = now + self.visibility_timeout;
                    let mut batch = Vec::with_capacity(take);

                    for mut message in state.ready.drain(..take).collect::<Vec<_>>() {
                        message.receive_count = message.receive_count.saturating_add(1);
                        let receipt = Receipt(format!("rc-{}", Uuid::new_v4().simple()));
                        batch.push(Delivery {
                            message_id: message.id.clone(),
                            receipt: receipt.clone(),
                            body: message.body.clone(),
                            receive_count: message.receive_count,
                        });
                        state.in_flight.insert(receipt, (message, expires_at));
                    }
                    return Ok(batch);
                }

                match state.next_expiry() {
                    Some(at) => at.min(deadline),
                    None => deadline,
                }
            };

            if self.is_closed() {
                return Err(QueueError::Unavailable("queue is closed".to_string()));
            }
            if Instant::now() >= deadline {
                return Ok(vec![]);
            }

            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    async fn ack(&self, receipt: &Receipt) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.reclaim_expired(Instant::now());
        match state.in_flight.remove(receipt) {
            Some((message, _)) => {
                debug!(message_id = %message.id, "Message acknowledged");
                Ok(())
            }
            None => Err(QueueError::UnknownReceipt(receipt.to_string())),
        }
    }

    async fn dead_letter(
        &self,
        delivery: &Delivery,
        reason: &DeadLetterReason,
    ) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.reclaim_expired(Instant::now());
        let Some((message, _)) = state.in_flight.remove(&delivery.receipt) else {
            return Err(QueueError::UnknownReceipt(delivery.receipt.to_string()));
        };

        warn!(message_id = %message.id, reason = reason.as_str(), "Message dead-lettered");
        state.dead.push(DeadLetter {
            message_id: message.id,
            body: message.body,
            reason: reason.clone(),
            receive_count: message.receive_count,
            dead_lettered_at: Utc::now(),
        });
        Ok(())
    }

    async fn depth(&self) -> Result<QueueDepth, QueueError> {
        let mut state = self.state.lock().await;
        state.reclaim_expired(Instant::now());
        Ok(QueueDepth {
            ready: state.ready.len(),
            in_flight: state.in_flight.len(),
            dead_lettered: state.dead.len(),
        })
    }
}
