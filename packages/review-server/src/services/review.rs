use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use danci_srs::{
    compute_next_review, preview_ratings, LearningStatus, MemoryState, Rating, RatingColor,
    ReviewSchedule,
};

use crate::services::session::{SessionError, SessionRegistry};
use crate::store::{ProgressKey, ProgressStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: String,
    pub word_id: String,
    pub rating: Rating,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub word_id: String,
    pub rating: Rating,
    pub previous: Option<MemoryState>,
    pub state: MemoryState,
    pub schedule: ReviewSchedule,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPreview {
    pub rating: Rating,
    pub label: &'static str,
    pub color: RatingColor,
    pub interval_days: u32,
    pub next_review_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub word_id: String,
    pub state: MemoryState,
    pub status: LearningStatus,
    pub due: bool,
    pub preview: Vec<RatingPreview>,
}

/// Rate one review: schedule and persist atomically, then count it in the session.
pub fn submit_review(
    store: &dyn ProgressStore,
    sessions: &SessionRegistry,
    request: &ReviewRequest,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ReviewError> {
    let key = ProgressKey::new(request.user_id.as_str(), request.word_id.as_str())?;

    if let Some(session_id) = request.session_id {
        sessions.ensure_open(session_id, &key.user_id)?;
    }

    let rating = request.rating;
    let transition = store.update(&key, &mut |previous| {
        let current = previous.cloned().unwrap_or_default();
        compute_next_review(&current, rating, now)
    })?;

    if let Some(session_id) = request.session_id {
        // The state is already persisted; a session closed in the meantime only
        // loses the count.
        if let Err(err) = sessions.record(session_id, &key.user_id, rating) {
            tracing::warn!(session_id = %session_id, error = %err, "review not counted in session");
        }
    }

    tracing::debug!(
        user_id = %key.user_id,
        word_id = %key.word_id,
        rating = rating.label(),
        interval_days = transition.current.interval_days,
        repetitions = transition.current.repetitions,
        ease_factor = transition.current.ease_factor,
        "review scheduled"
    );

    Ok(ReviewOutcome {
        schedule: transition.current.schedule(),
        word_id: key.word_id,
        rating,
        previous: transition.previous,
        state: transition.current,
    })
}

/// Stored state of one word plus what each rating would schedule next.
pub fn get_progress(
    store: &dyn ProgressStore,
    user_id: &str,
    word_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<ProgressView>, ReviewError> {
    let key = ProgressKey::new(user_id, word_id)?;
    let Some(state) = store.fetch(&key)? else {
        return Ok(None);
    };

    let preview = preview_ratings(&state, now)
        .into_iter()
        .map(|(rating, next)| RatingPreview {
            rating,
            label: rating.label(),
            color: rating.color(),
            interval_days: next.interval_days,
            next_review_at: next.next_review_at,
        })
        .collect();

    Ok(Some(ProgressView {
        word_id: key.word_id,
        status: state.status(),
        due: state.is_due(now),
        preview,
        state,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProgressStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 7, 0, 0).unwrap()
    }

    fn request(word_id: &str, rating: Rating, session_id: Option<Uuid>) -> ReviewRequest {
        ReviewRequest {
            user_id: "u1".to_string(),
            word_id: word_id.to_string(),
            rating,
            session_id,
        }
    }

    #[test]
    fn consecutive_reviews_progress() {
        let store = MemoryProgressStore::new();
        let sessions = SessionRegistry::new();

        let mut last = None;
        for _ in 0..3 {
            last = Some(submit_review(&store, &sessions, &request("w1", Rating::Good, None), now()).unwrap());
        }
        let outcome = last.unwrap();
        assert_eq!(outcome.state.interval_days, 15);
        assert_eq!(outcome.schedule.status, LearningStatus::Learned);
        assert_eq!(outcome.previous.map(|p| p.repetitions), Some(2));
    }

    #[test]
    fn review_counts_in_session() {
        let store = MemoryProgressStore::new();
        let sessions = SessionRegistry::new();
        let session = sessions.start("u1", None, now());

        submit_review(&store, &sessions, &request("w1", Rating::Again, Some(session.id)), now()).unwrap();
        submit_review(&store, &sessions, &request("w2", Rating::Easy, Some(session.id)), now()).unwrap();

        let summary = sessions.summary(session.id, now()).unwrap();
        assert_eq!(summary.counts.again, 1);
        assert_eq!(summary.counts.easy, 1);
    }

    #[test]
    fn closed_session_rejects_before_scheduling() {
        let store = MemoryProgressStore::new();
        let sessions = SessionRegistry::new();
        let session = sessions.start("u1", None, now());
        sessions.finish(session.id, now()).unwrap();

        let result = submit_review(&store, &sessions, &request("w1", Rating::Good, Some(session.id)), now());
        assert!(matches!(result, Err(ReviewError::Session(SessionError::AlreadyFinished(_)))));

        let key = ProgressKey::new("u1", "w1").unwrap();
        assert!(store.fetch(&key).unwrap().is_none());
    }

    #[test]
    fn blank_word_is_rejected() {
        let store = MemoryProgressStore::new();
        let sessions = SessionRegistry::new();
        let result = submit_review(&store, &sessions, &request(" ", Rating::Good, None), now());
        assert!(matches!(result, Err(ReviewError::Store(StoreError::InvalidKey(_)))));
    }

    #[test]
    fn progress_includes_preview() {
        let store = MemoryProgressStore::new();
        let sessions = SessionRegistry::new();
        assert!(get_progress(&store, "u1", "w1", now()).unwrap().is_none());

        submit_review(&store, &sessions, &request("w1", Rating::Good, None), now()).unwrap();
        let view = get_progress(&store, "u1", "w1", now()).unwrap().unwrap();
        assert!(!view.due);
        assert_eq!(view.preview.len(), 4);
        assert_eq!(view.preview[2].interval_days, 6);
        assert_eq!(view.preview[0].label, "Again");
    }
}
