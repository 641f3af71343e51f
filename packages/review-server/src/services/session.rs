//! Review session bookkeeping: per-rating counts and elapsed time.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use danci_srs::Rating;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
    #[error("session already finished: {0}")]
    AlreadyFinished(Uuid),
    #[error("session {0} belongs to another user")]
    UserMismatch(Uuid),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingCounts {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl RatingCounts {
    pub fn record(&mut self, rating: Rating) {
        let slot = match rating {
            Rating::Again => &mut self.again,
            Rating::Hard => &mut self.hard,
            Rating::Good => &mut self.good,
            Rating::Easy => &mut self.easy,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.again
            .saturating_add(self.hard)
            .saturating_add(self.good)
            .saturating_add(self.easy)
    }

    /// Share of non-`Again` answers, 0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(total.saturating_sub(self.again)) / f64::from(total)
    }
}

#[derive(Debug, Clone)]
struct ReviewSession {
    user_id: String,
    set_id: Option<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    counts: RatingCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub user_id: String,
    pub set_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub counts: RatingCounts,
    pub total: u32,
    pub accuracy: f64,
    pub elapsed_seconds: i64,
}

impl ReviewSession {
    /// Finished sessions expire `retention.finished` after finishing, open ones
    /// `retention.open` after starting.
    fn is_expired(&self, retention: &SessionRetention, now: DateTime<Utc>) -> bool {
        match self.finished_at {
            Some(finished_at) => now - finished_at > retention.finished,
            None => now - self.started_at > retention.open,
        }
    }

    fn summary(&self, id: Uuid, now: DateTime<Utc>) -> SessionSummary {
        let end = self.finished_at.unwrap_or(now);
        SessionSummary {
            id,
            user_id: self.user_id.clone(),
            set_id: self.set_id.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
            counts: self.counts,
            total: self.counts.total(),
            accuracy: self.counts.accuracy(),
            elapsed_seconds: (end - self.started_at).num_seconds().max(0),
        }
    }
}

/// How long sessions stay readable before the registry drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRetention {
    pub finished: Duration,
    pub open: Duration,
}

impl Default for SessionRetention {
    fn default() -> Self {
        Self {
            finished: Duration::hours(1),
            open: Duration::hours(24),
        }
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, ReviewSession>>,
    retention: SessionRetention,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: SessionRetention) -> Self {
        Self {
            sessions: RwLock::default(),
            retention,
        }
    }

    /// Drop expired sessions, returning how many were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(&self.retention, now));
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "expired review sessions dropped");
        }
        removed
    }

    pub fn start(&self, user_id: &str, set_id: Option<String>, now: DateTime<Utc>) -> SessionSummary {
        self.prune(now);
        let id = Uuid::new_v4();
        let session = ReviewSession {
            user_id: user_id.to_string(),
            set_id,
            started_at: now,
            finished_at: None,
            counts: RatingCounts::default(),
        };
        let summary = session.summary(id, now);
        self.sessions.write().insert(id, session);
        tracing::info!(session_id = %id, user_id, "review session started");
        summary
    }

    /// Fails unless the session exists, is open and belongs to `user_id`.
    pub fn ensure_open(&self, id: Uuid, user_id: &str) -> Result<(), SessionError> {
        let sessions = self.sessions.read();
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        check_open(id, session, user_id)
    }

    pub fn record(&self, id: Uuid, user_id: &str, rating: Rating) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        check_open(id, session, user_id)?;
        session.counts.record(rating);
        Ok(())
    }

    pub fn finish(&self, id: Uuid, now: DateTime<Utc>) -> Result<SessionSummary, SessionError> {
        self.prune(now);
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        if session.finished_at.is_some() {
            return Err(SessionError::AlreadyFinished(id));
        }
        session.finished_at = Some(now);
        let summary = session.summary(id, now);
        tracing::info!(
            session_id = %id,
            total = summary.total,
            accuracy = summary.accuracy,
            elapsed_seconds = summary.elapsed_seconds,
            "review session finished"
        );
        Ok(summary)
    }

    pub fn summary(&self, id: Uuid, now: DateTime<Utc>) -> Result<SessionSummary, SessionError> {
        let sessions = self.sessions.read();
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.summary(id, now))
    }
}

fn check_open(id: Uuid, session: &ReviewSession, user_id: &str) -> Result<(), SessionError> {
    if session.user_id != user_id {
        return Err(SessionError::UserMismatch(id));
    }
    if session.finished_at.is_some() {
        return Err(SessionError::AlreadyFinished(id));
    }
    Ok(())
}
