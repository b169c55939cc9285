//! User feedback and rewards.
//!
//! - [`FeedbackEvent`] — one accept/reject judgement on one finding
//! - [`RewardEngine`] — maps an event to a bounded weight delta

pub mod event;
pub mod reward;

pub use event::{FeedbackEvent, FeedbackValidationError, MAX_RATING, MIN_RATING};
pub use reward::{ACCEPT_MAX, REJECT_MAX, RewardEngine};
