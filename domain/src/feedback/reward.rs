//! Reward engine
//!
//! Accepts build trust five times faster than rejects erode it, so a single
//! bad interaction cannot crater an agent.

use super::event::{FeedbackEvent, MAX_RATING, MIN_RATING};

/// Reward for an accept at the highest rating
pub const ACCEPT_MAX: f64 = 0.25;
/// Magnitude of the penalty for a reject at the highest rating
pub const REJECT_MAX: f64 = 0.05;

/// Pure mapping from feedback to a bounded reward
///
/// ```
/// use council_domain::RewardEngine;
///
/// assert_eq!(RewardEngine::reward(true, 5), 0.25);
/// assert_eq!(RewardEngine::reward(false, 5), -0.05);
/// assert_eq!(RewardEngine::reward(true, 1), 0.05);
/// ```
pub struct RewardEngine;

impl RewardEngine {
    /// `(rating / 5) × ACCEPT_MAX` when accepted, `-(rating / 5) × REJECT_MAX`
    /// otherwise. Ratings outside 1..=5 are clamped first.
    pub fn reward(accepted: bool, rating: u8) -> f64 {
        let scale = f64::from(rating.clamp(MIN_RATING, MAX_RATING)) / f64::from(MAX_RATING);
        if accepted {
            scale * ACCEPT_MAX
        } else {
            -(scale * REJECT_MAX)
        }
    }

    pub fn for_event(event: &FeedbackEvent) -> f64 {
        Self::reward(event.accepted, event.rating)
    }
}
