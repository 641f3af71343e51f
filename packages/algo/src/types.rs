//! Common Types and Constants
//!
//! Memory state, wire contracts and scheduling constants shared by all modules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize;

// ==================== Constants ====================

/// Ease factor for a word that has never been reviewed
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Ease factor floor, applied on both failure and success paths
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Hard cap on the scheduled interval
pub const MAX_INTERVAL_DAYS: u32 = 365;

/// Consecutive successes required for `LearningStatus::Learned`
pub const LEARNED_REPETITIONS: u32 = 3;

/// Ease penalty applied on `Again`
pub const FAILURE_EASE_PENALTY: f64 = 0.2;

/// Interval multiplier applied on `Hard`
pub const HARD_INTERVAL_FACTOR: f64 = 0.7;

/// Interval multiplier applied on `Easy`
pub const EASY_INTERVAL_FACTOR: f64 = 1.3;

/// Interval after the first consecutive success
pub const FIRST_INTERVAL_DAYS: u32 = 1;

/// Interval after the second consecutive success
pub const SECOND_INTERVAL_DAYS: u32 = 6;

/// Interval after a failed recall
pub const RELEARN_INTERVAL_DAYS: u32 = 1;

// ==================== Memory State ====================

/// 学习状态 (由 repetitions 推导，不单独存储)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStatus {
    Learning,
    Learned,
}

impl LearningStatus {
    pub fn from_repetitions(repetitions: u32) -> Self {
        if repetitions >= LEARNED_REPETITIONS {
            Self::Learned
        } else {
            Self::Learning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Learned => "learned",
        }
    }
}

/// Scheduling record for one (learner, word) pair.
///
/// Values are produced either by [`MemoryState::default`], by the sanitizing
/// [`MemoryState::from_input`], or by [`crate::compute_next_review`]. `status` is
/// never a field: it is always read through [`MemoryState::status`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub review_count: u32,
    pub next_review_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            review_count: 0,
            next_review_at: None,
            last_reviewed_at: None,
        }
    }
}

impl MemoryState {
    /// Build a state from a partial, possibly corrupted, input record.
    pub fn from_input(input: &MemoryInput) -> Self {
        Self {
            ease_factor: sanitize::sanitize_ease_factor(input.ease_factor),
            interval_days: sanitize::sanitize_interval(input.interval_days),
            repetitions: sanitize::sanitize_count(input.repetitions),
            review_count: sanitize::sanitize_count(input.review_count),
            next_review_at: input.next_review_at,
            last_reviewed_at: input.last_reviewed_at,
        }
    }

    pub fn status(&self) -> LearningStatus {
        LearningStatus::from_repetitions(self.repetitions)
    }

    /// A word with no scheduled review yet counts as due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.map(|at| at <= now).unwrap_or(true)
    }

    /// Whole days past the scheduled review, 0 when not yet due.
    pub fn overdue_days(&self, now: DateTime<Utc>) -> i64 {
        match self.next_review_at {
            Some(at) if at < now => (now - at).num_days(),
            _ => 0,
        }
    }

    pub fn schedule(&self) -> ReviewSchedule {
        ReviewSchedule::from(self)
    }
}

/// Input contract: every field optional, absent fields take the defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryInput {
    pub ease_factor: Option<f64>,
    pub interval_days: Option<i64>,
    pub repetitions: Option<i64>,
    pub review_count: Option<i64>,
    pub next_review_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

/// Output contract handed to the progress store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchedule {
    pub interval_days: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub next_review_at: Option<DateTime<Utc>>,
    pub status: LearningStatus,
}

impl From<&MemoryState> for ReviewSchedule {
    fn from(state: &MemoryState) -> Self {
        Self {
            interval_days: state.interval_days,
            repetitions: state.repetitions,
            ease_factor: state.ease_factor,
            next_review_at: state.next_review_at,
            status: state.status(),
        }
    }
}

/// `now + days` as whole calendar days, saturating at the last representable instant.
pub fn add_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_default_state() {
        let state = MemoryState::default();
        assert_eq!(state.ease_factor, DEFAULT_EASE_FACTOR);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.status(), LearningStatus::Learning);
        assert!(state.last_reviewed_at.is_none());
    }

    #[test]
    fn test_status_threshold() {
        assert_eq!(LearningStatus::from_repetitions(2), LearningStatus::Learning);
        assert_eq!(LearningStatus::from_repetitions(3), LearningStatus::Learned);
        assert_eq!(LearningStatus::from_repetitions(40), LearningStatus::Learned);
    }

    #[test]
    fn test_empty_input_matches_default() {
        let state = MemoryState::from_input(&MemoryInput::default());
        assert_eq!(state, MemoryState::default());
    }

    #[test]
    fn test_input_deserializes_partial_json() {
        let input: MemoryInput = serde_json::from_str(r#"{"easeFactor":2.1}"#).unwrap();
        assert_eq!(input.ease_factor, Some(2.1));
        assert_eq!(input.interval_days, None);

        let state = MemoryState::from_input(&input);
        assert_eq!(state.ease_factor, 2.1);
        assert_eq!(state.repetitions, 0);
    }

    #[test]
    fn test_is_due() {
        let now = fixed_now();
        let mut state = MemoryState::default();
        assert!(state.is_due(now));

        state.next_review_at = Some(now);
        assert!(state.is_due(now));

        state.next_review_at = Some(add_days(now, 1));
        assert!(!state.is_due(now));
        assert_eq!(state.overdue_days(now), 0);
        assert_eq!(state.overdue_days(add_days(now, 4)), 3);
    }

    #[test]
    fn test_add_days_saturates_at_end_of_range() {
        let end = DateTime::<Utc>::MAX_UTC;
        assert_eq!(add_days(end, 1), end);
        assert_eq!(add_days(end - Duration::days(3), MAX_INTERVAL_DAYS), end);
        assert_eq!(add_days(end - Duration::days(3), 2), end - Duration::days(1));
    }

    #[test]
    fn test_schedule_serializes_camel_case() {
        let state = MemoryState {
            interval_days: 6,
            repetitions: 3,
            next_review_at: Some(fixed_now()),
            ..Default::default()
        };
        let json = serde_json::to_value(state.schedule()).unwrap();
        assert_eq!(json["intervalDays"], 6);
        assert_eq!(json["status"], "learned");
        assert!(json.get("nextReviewAt").is_some());
    }
}
