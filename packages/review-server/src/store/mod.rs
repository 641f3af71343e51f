//! Progress Store
//!
//! Per-(learner, word) memory state. Implementations must make
//! [`ProgressStore::update`] atomic per key: the closure sees the current state
//! and its result is persisted before any other update of the same key runs.

mod memory;

pub use memory::MemoryProgressStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use danci_srs::{LearningStatus, MemoryState};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressKey {
    pub user_id: String,
    pub word_id: String,
}

impl ProgressKey {
    pub fn new(user_id: impl Into<String>, word_id: impl Into<String>) -> Result<Self, StoreError> {
        let user_id = user_id.into().trim().to_string();
        let word_id = word_id.into().trim().to_string();
        if user_id.is_empty() {
            return Err(StoreError::InvalidKey("userId must not be empty".to_string()));
        }
        if word_id.is_empty() {
            return Err(StoreError::InvalidKey("wordId must not be empty".to_string()));
        }
        Ok(Self { user_id, word_id })
    }
}

/// "Which words are due for this learner", optionally inside one word set.
#[derive(Debug, Clone)]
pub struct DueQuery {
    pub user_id: String,
    pub set_id: Option<String>,
    pub now: DateTime<Utc>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueWord {
    pub word_id: String,
    pub state: MemoryState,
    pub status: LearningStatus,
    pub overdue_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total: usize,
    pub learning: usize,
    pub learned: usize,
    pub due: usize,
}

/// The result of one atomic read-modify-write.
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub previous: Option<MemoryState>,
    pub current: MemoryState,
}

pub trait ProgressStore: Send + Sync {
    fn fetch(&self, key: &ProgressKey) -> Result<Option<MemoryState>, StoreError>;

    fn upsert(&self, key: &ProgressKey, state: MemoryState) -> Result<(), StoreError>;

    /// Read-modify-write under the key's lock. `None` is passed for a word the
    /// learner has never reviewed.
    fn update(
        &self,
        key: &ProgressKey,
        apply: &mut dyn FnMut(Option<&MemoryState>) -> MemoryState,
    ) -> Result<StateTransition, StoreError>;

    /// States with `nextReviewAt <= now`, earliest first, at most `limit`.
    fn due(&self, query: &DueQuery) -> Result<Vec<DueWord>, StoreError>;

    fn register_words(&self, set_id: &str, word_ids: &[String]) -> Result<usize, StoreError>;

    /// Drop stored states so the words start over from defaults.
    fn reset(&self, user_id: &str, set_id: Option<&str>) -> Result<usize, StoreError>;

    fn stats(
        &self,
        user_id: &str,
        set_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ProgressStats, StoreError>;
}
