//! SM-2 Scheduler
//!
//! The single scheduling policy used for every review:
//!
//! - `Again` resets the streak: repetitions 0, interval 1 day, ease − 0.2
//! - other ratings extend the streak: 1 day, 6 days, then `interval × ease`
//! - `Hard` shrinks the fresh interval by 0.7, `Easy` stretches it by 1.3
//! - ease follows the SuperMemo delta, floored at 1.3, stored with 2 decimals
//! - the interval never exceeds 365 days
//!
//! Rounding is half away from zero throughout.

use chrono::{DateTime, Utc};

use crate::rating::Rating;
use crate::sanitize::{round_days, round_ease_factor, sanitize_ease_factor};
use crate::types::{
    add_days, MemoryState, EASY_INTERVAL_FACTOR, FAILURE_EASE_PENALTY, FIRST_INTERVAL_DAYS,
    HARD_INTERVAL_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR, RELEARN_INTERVAL_DAYS,
    SECOND_INTERVAL_DAYS,
};

/// Compute the state after one rated review.
///
/// Total over its input: an ease factor below the floor is treated as the floor,
/// a non-finite one as the default, and the input is never modified.
pub fn compute_next_review(state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState {
    let ease = sanitize_ease_factor(Some(state.ease_factor));

    let (repetitions, interval, next_ease) = if rating.is_failure() {
        (
            0,
            RELEARN_INTERVAL_DAYS,
            (ease - FAILURE_EASE_PENALTY).max(MIN_EASE_FACTOR),
        )
    } else {
        let repetitions = state.repetitions.saturating_add(1);
        let base = base_interval(repetitions, state.interval_days, ease);
        // a successful review never schedules a same-day repeat
        let interval = adjust_for_rating(base, rating).max(FIRST_INTERVAL_DAYS);
        (repetitions, interval, next_ease_factor(ease, rating.quality()))
    };

    let interval_days = interval.min(MAX_INTERVAL_DAYS);

    MemoryState {
        ease_factor: round_ease_factor(next_ease).max(MIN_EASE_FACTOR),
        interval_days,
        repetitions,
        review_count: state.review_count.saturating_add(1),
        next_review_at: Some(add_days(now, interval_days)),
        last_reviewed_at: Some(now),
    }
}

/// Outcome of every rating for `state`, in rating order. Used to label answer
/// buttons with the interval each one would schedule.
pub fn preview_ratings(state: &MemoryState, now: DateTime<Utc>) -> [(Rating, MemoryState); 4] {
    Rating::ALL.map(|rating| (rating, compute_next_review(state, rating, now)))
}

/// Interval for the repetitions tier, before the rating adjustment.
fn base_interval(repetitions: u32, previous_interval: u32, ease: f64) -> u32 {
    match repetitions {
        1 => FIRST_INTERVAL_DAYS,
        2 => SECOND_INTERVAL_DAYS,
        _ => round_days(f64::from(previous_interval) * ease),
    }
}

fn adjust_for_rating(interval: u32, rating: Rating) -> u32 {
    match rating {
        Rating::Hard => round_days(f64::from(interval) * HARD_INTERVAL_FACTOR).max(1),
        Rating::Easy => round_days(f64::from(interval) * EASY_INTERVAL_FACTOR),
        Rating::Good | Rating::Again => interval,
    }
}

/// SuperMemo ease delta for quality `q` on the 0-5 scale.
pub fn next_ease_factor(ease: f64, quality: u8) -> f64 {
    let miss = 5.0 - f64::from(quality.min(5));
    (ease + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}
