//! Batch scheduling
//!
//! Reviews of different words are independent, so a batch is scheduled in
//! parallel (Rayon). Output order matches input order.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::rating::Rating;
use crate::scheduler::compute_next_review;
use crate::types::MemoryState;

/// Below this size the batch is scheduled on the calling thread
pub const PARALLEL_THRESHOLD: usize = 256;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReview {
    pub state: MemoryState,
    pub rating: Rating,
}

/// Schedule every review in `items` against the same instant.
pub fn schedule_batch(items: &[BatchReview], now: DateTime<Utc>) -> Vec<MemoryState> {
    if items.len() < PARALLEL_THRESHOLD {
        return items
            .iter()
            .map(|item| compute_next_review(&item.state, item.rating, now))
            .collect();
    }

    items
        .par_iter()
        .map(|item| compute_next_review(&item.state, item.rating, now))
        .collect()
}
