use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use danci_srs::{LearningStatus, MemoryState};

use super::{
    DueQuery, DueWord, ProgressKey, ProgressStats, ProgressStore, StateTransition, StoreError,
};

/// A retired slot has been unlinked from `records` by a reset; writers that
/// still hold it must look the key up again.
#[derive(Default)]
struct Entry {
    state: Option<MemoryState>,
    retired: bool,
}

type Slot = Arc<Mutex<Entry>>;

/// In-process store: one mutex per (learner, word) slot.
///
/// Lock order is `word_sets` → `records` → slot. A slot lock is never held
/// while taking a map lock.
#[derive(Default)]
pub struct MemoryProgressStore {
    records: RwLock<HashMap<ProgressKey, Slot>>,
    word_sets: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &ProgressKey) -> Slot {
        if let Some(slot) = self.records.read().get(key) {
            return Arc::clone(slot);
        }
        let mut records = self.records.write();
        Arc::clone(records.entry(key.clone()).or_default())
    }

    /// Run `write` on the live slot of `key`, retrying past slots retired by a
    /// concurrent reset.
    fn with_live_slot<T>(&self, key: &ProgressKey, mut write: impl FnMut(&mut Entry) -> T) -> T {
        loop {
            let slot = self.slot(key);
            let mut entry = slot.lock();
            if !entry.retired {
                return write(&mut *entry);
            }
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.records.read().len()
    }

    /// Snapshot of the learner's stored states, restricted to a set when given.
    fn collect_states(&self, user_id: &str, set_id: Option<&str>) -> Vec<(String, MemoryState)> {
        let word_sets = self.word_sets.read();
        let members = match set_id {
            Some(set_id) => match word_sets.get(set_id) {
                Some(words) => Some(words),
                None => return Vec::new(),
            },
            None => None,
        };

        let records = self.records.read();
        records
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .filter(|(key, _)| members.map(|m| m.contains(&key.word_id)).unwrap_or(true))
            .filter_map(|(key, slot)| {
                slot.lock()
                    .state
                    .as_ref()
                    .map(|state| (key.word_id.clone(), state.clone()))
            })
            .collect()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn fetch(&self, key: &ProgressKey) -> Result<Option<MemoryState>, StoreError> {
        let records = self.records.read();
        Ok(records.get(key).and_then(|slot| slot.lock().state.clone()))
    }

    fn upsert(&self, key: &ProgressKey, state: MemoryState) -> Result<(), StoreError> {
        self.with_live_slot(key, |entry| entry.state = Some(state.clone()));
        Ok(())
    }

    fn update(
        &self,
        key: &ProgressKey,
        apply: &mut dyn FnMut(Option<&MemoryState>) -> MemoryState,
    ) -> Result<StateTransition, StoreError> {
        let transition = self.with_live_slot(key, |entry| {
            let previous = entry.state.clone();
            let current = apply(previous.as_ref());
            entry.state = Some(current.clone());
            StateTransition { previous, current }
        });
        Ok(transition)
    }

    fn due(&self, query: &DueQuery) -> Result<Vec<DueWord>, StoreError> {
        let mut due: Vec<DueWord> = self
            .collect_states(&query.user_id, query.set_id.as_deref())
            .into_iter()
            .filter(|(_, state)| state.is_due(query.now))
            .map(|(word_id, state)| DueWord {
                status: state.status(),
                overdue_days: state.overdue_days(query.now),
                word_id,
                state,
            })
            .collect();

        due.sort_by(|a, b| {
            a.state
                .next_review_at
                .cmp(&b.state.next_review_at)
                .then_with(|| a.word_id.cmp(&b.word_id))
        });
        due.truncate(query.limit);
        Ok(due)
    }

    fn register_words(&self, set_id: &str, word_ids: &[String]) -> Result<usize, StoreError> {
        let set_id = set_id.trim();
        if set_id.is_empty() {
            return Err(StoreError::InvalidKey("setId must not be empty".to_string()));
        }

        let mut word_sets = self.word_sets.write();
        let members = word_sets.entry(set_id.to_string()).or_default();
        let added = word_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .filter(|id| members.insert((*id).to_string()))
            .count();

        tracing::debug!(set_id, added, total = members.len(), "words registered");
        Ok(added)
    }

    fn reset(&self, user_id: &str, set_id: Option<&str>) -> Result<usize, StoreError> {
        let word_sets = self.word_sets.read();
        let members = match set_id {
            Some(set_id) => match word_sets.get(set_id) {
                Some(words) => Some(words),
                None => return Ok(0),
            },
            None => None,
        };

        // Retiring under the map write lock means an in-flight update either
        // lands before the reset or retries on a fresh slot after it.
        let mut records = self.records.write();
        let mut removed = 0;
        records.retain(|key, slot| {
            let matches = key.user_id == user_id
                && members.map(|m| m.contains(&key.word_id)).unwrap_or(true);
            if !matches {
                return true;
            }
            let mut entry = slot.lock();
            entry.retired = true;
            if entry.state.take().is_some() {
                removed += 1;
            }
            false
        });

        tracing::info!(user_id, set_id = ?set_id, removed, "progress reset");
        Ok(removed)
    }

    fn stats(
        &self,
        user_id: &str,
        set_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ProgressStats, StoreError> {
        let states = self.collect_states(user_id, set_id);
        let mut stats = ProgressStats {
            total: states.len(),
            ..Default::default()
        };
        for (_, state) in &states {
            match state.status() {
                LearningStatus::Learning => stats.learning += 1,
                LearningStatus::Learned => stats.learned += 1,
            }
            if state.is_due(now) {
                stats.due += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use danci_srs::{compute_next_review, Rating};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn key(user: &str, word: &str) -> ProgressKey {
        ProgressKey::new(user, word).unwrap()
    }

    fn scheduled(days_from_now: i64, repetitions: u32) -> MemoryState {
        MemoryState {
            repetitions,
            next_review_at: Some(now() + Duration::days(days_from_now)),
            ..Default::default()
        }
    }

    #[test]
    fn fetch_missing_is_none() {
        let store = MemoryProgressStore::new();
        assert!(store.fetch(&key("u1", "w1")).unwrap().is_none());
    }

    #[test]
    fn update_sees_previous_state() {
        let store = MemoryProgressStore::new();
        let k = key("u1", "w1");

        let first = store
            .update(&k, &mut |prev| {
                compute_next_review(&prev.cloned().unwrap_or_default(), Rating::Good, now())
            })
            .unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.current.repetitions, 1);

        let second = store
            .update(&k, &mut |prev| {
                compute_next_review(&prev.cloned().unwrap_or_default(), Rating::Good, now())
            })
            .unwrap();
        assert_eq!(second.previous.map(|s| s.repetitions), Some(1));
        assert_eq!(second.current.interval_days, 6);
        assert_eq!(store.fetch(&k).unwrap(), Some(second.current));
    }

    #[test]
    fn due_is_ordered_limited_and_scoped() {
        let store = MemoryProgressStore::new();
        store.register_words("set-a", &["w1".into(), "w2".into()]).unwrap();
        store.upsert(&key("u1", "w1"), scheduled(-1, 1)).unwrap();
        store.upsert(&key("u1", "w2"), scheduled(-5, 1)).unwrap();
        store.upsert(&key("u1", "w3"), scheduled(-3, 1)).unwrap();
        store.upsert(&key("u1", "w4"), scheduled(2, 1)).unwrap();
        store.upsert(&key("u2", "w1"), scheduled(-9, 1)).unwrap();

        let all = store
            .due(&DueQuery { user_id: "u1".into(), set_id: None, now: now(), limit: 10 })
            .unwrap();
        let ids: Vec<&str> = all.iter().map(|d| d.word_id.as_str()).collect();
        assert_eq!(ids, vec!["w2", "w3", "w1"]);
        assert_eq!(all[0].overdue_days, 5);

        let scoped = store
            .due(&DueQuery { user_id: "u1".into(), set_id: Some("set-a".into()), now: now(), limit: 1 })
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].word_id, "w2");

        let unknown_set = store
            .due(&DueQuery { user_id: "u1".into(), set_id: Some("nope".into()), now: now(), limit: 10 })
            .unwrap();
        assert!(unknown_set.is_empty());
    }

    #[test]
    fn reset_clears_only_matching_words() {
        let store = MemoryProgressStore::new();
        store.register_words("set-a", &["w1".into()]).unwrap();
        store.upsert(&key("u1", "w1"), scheduled(1, 3)).unwrap();
        store.upsert(&key("u1", "w2"), scheduled(1, 3)).unwrap();
        store.upsert(&key("u2", "w1"), scheduled(1, 3)).unwrap();

        assert_eq!(store.reset("u1", Some("set-a")).unwrap(), 1);
        assert!(store.fetch(&key("u1", "w1")).unwrap().is_none());
        assert!(store.fetch(&key("u1", "w2")).unwrap().is_some());

        assert_eq!(store.reset("u1", None).unwrap(), 1);
        assert!(store.fetch(&key("u2", "w1")).unwrap().is_some());
    }

    #[test]
    fn reset_releases_slots() {
        let store = MemoryProgressStore::new();
        for word in ["w1", "w2", "w3"] {
            store.upsert(&key("u1", word), scheduled(1, 1)).unwrap();
        }
        store.upsert(&key("u2", "w1"), scheduled(1, 1)).unwrap();
        assert_eq!(store.slot_count(), 4);

        assert_eq!(store.reset("u1", None).unwrap(), 3);
        assert_eq!(store.slot_count(), 1);

        // a word reviewed again after reset starts from defaults
        let transition = store
            .update(&key("u1", "w1"), &mut |prev| {
                compute_next_review(&prev.cloned().unwrap_or_default(), Rating::Good, now())
            })
            .unwrap();
        assert!(transition.previous.is_none());
        assert_eq!(transition.current.repetitions, 1);
    }

    #[test]
    fn reset_racing_updates_never_loses_a_slot() {
        let store = Arc::new(MemoryProgressStore::new());
        let k = key("u1", "w1");
        let writer = {
            let store = Arc::clone(&store);
            let k = k.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    store
                        .update(&k, &mut |prev| {
                            compute_next_review(&prev.cloned().unwrap_or_default(), Rating::Good, now())
                        })
                        .unwrap();
                }
            })
        };
        for _ in 0..50 {
            store.reset("u1", None).unwrap();
        }
        writer.join().unwrap();

        // the last write always lands on the slot visible to readers
        store.upsert(&k, scheduled(1, 7)).unwrap();
        assert_eq!(store.fetch(&k).unwrap().map(|s| s.repetitions), Some(7));
        assert_eq!(store.slot_count(), 1);
    }

    #[test]
    fn stats_count_status_and_due() {
        let store = MemoryProgressStore::new();
        store.upsert(&key("u1", "w1"), scheduled(-1, 0)).unwrap();
        store.upsert(&key("u1", "w2"), scheduled(4, 3)).unwrap();
        store.upsert(&key("u1", "w3"), scheduled(0, 5)).unwrap();

        let stats = store.stats("u1", None, now()).unwrap();
        assert_eq!(
            stats,
            ProgressStats { total: 3, learning: 1, learned: 2, due: 2 }
        );
    }

    #[test]
    fn register_words_ignores_duplicates_and_blanks() {
        let store = MemoryProgressStore::new();
        let added = store
            .register_words("set-a", &["w1".into(), " w1 ".into(), "".into(), "w2".into()])
            .unwrap();
        assert_eq!(added, 2);
        assert!(store.register_words(" ", &["w3".into()]).is_err());
    }

    #[test]
    fn concurrent_updates_of_one_key_serialize() {
        let store = Arc::new(MemoryProgressStore::new());
        let k = key("u1", "w1");
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let k = k.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store
                            .update(&k, &mut |prev| {
                                compute_next_review(
                                    &prev.cloned().unwrap_or_default(),
                                    Rating::Again,
                                    now(),
                                )
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        let state = store.fetch(&k).unwrap().unwrap();
        assert_eq!(state.review_count, 400);
    }
}
