//! Feedback event entity

use crate::analysis::AnalysisId;
use crate::core::agent_id::AgentId;
use crate::finding::FindingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Reasons a feedback event is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackValidationError {
    #[error("analysis_id is empty")]
    EmptyAnalysisId,

    #[error("finding_id is empty")]
    EmptyFindingId,

    #[error("invalid agent id: {0:?}")]
    InvalidAgentId(String),

    #[error("rating {0} outside {MIN_RATING}..={MAX_RATING}")]
    RatingOutOfRange(u8),
}

/// One user judgement on one finding
///
/// Serialized as the queue message body:
/// `{analysis_id, finding_id, agent_id, accepted, rating, enqueued_at}`.
/// The delivery attempt is queue metadata and is not part of the body.
///
/// # Example
///
/// ```
/// use council_domain::FeedbackEvent;
///
/// let event = FeedbackEvent::new("an-1", "style-0", "style", true, 4).unwrap();
/// assert_eq!(event.rating, 4);
///
/// assert!(FeedbackEvent::new("an-1", "style-0", "style", true, 6).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub analysis_id: AnalysisId,
    pub finding_id: FindingId,
    pub agent_id: AgentId,
    pub accepted: bool,
    pub rating: u8,
    pub enqueued_at: DateTime<Utc>,
    #[serde(skip)]
    pub attempt: u32,
}

impl FeedbackEvent {
    /// Build and validate an event stamped with the current time
    pub fn new(
        analysis_id: impl Into<AnalysisId>,
        finding_id: impl Into<FindingId>,
        agent_id: impl Into<AgentId>,
        accepted: bool,
        rating: u8,
    ) -> Result<Self, FeedbackValidationError> {
        let event = Self {
            analysis_id: analysis_id.into(),
            finding_id: finding_id.into(),
            agent_id: agent_id.into(),
            accepted,
            rating,
            enqueued_at: Utc::now(),
            attempt: 0,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), FeedbackValidationError> {
        if self.analysis_id.as_str().trim().is_empty() {
            return Err(FeedbackValidationError::EmptyAnalysisId);
        }
        if self.finding_id.as_str().trim().is_empty() {
            return Err(FeedbackValidationError::EmptyFindingId);
        }
        if !self.agent_id.is_valid() {
            return Err(FeedbackValidationError::InvalidAgentId(
                self.agent_id.to_string(),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(FeedbackValidationError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }

    /// Record which delivery attempt this copy of the event arrived on
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// Key identifying the judgement regardless of delivery count
    pub fn dedup_key(&self) -> String {
        format!("{}/{}/{}", self.analysis_id, self.finding_id, self.agent_id)
    }
}
