//! Learner simulation
//!
//! Replays a synthetic learner against the scheduler to observe long-run
//! behaviour (interval growth, cap convergence, failure resets). Each review
//! happens exactly on the scheduled date. A fixed seed gives a fixed trajectory.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::rating::Rating;
use crate::scheduler::compute_next_review;
use crate::types::MemoryState;

/// Relative weight of each rating. Weights need not sum to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub again: f64,
    pub hard: f64,
    pub good: f64,
    pub easy: f64,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            again: 0.1,
            hard: 0.15,
            good: 0.6,
            easy: 0.15,
        }
    }
}

impl LearnerProfile {
    /// A learner who always answers with `rating`.
    pub fn constant(rating: Rating) -> Self {
        let mut profile = Self {
            again: 0.0,
            hard: 0.0,
            good: 0.0,
            easy: 0.0,
        };
        match rating {
            Rating::Again => profile.again = 1.0,
            Rating::Hard => profile.hard = 1.0,
            Rating::Good => profile.good = 1.0,
            Rating::Easy => profile.easy = 1.0,
        }
        profile
    }

    fn weights(&self) -> [f64; 4] {
        [self.again, self.hard, self.good, self.easy].map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
    }

    /// Draw one rating. A profile with no positive weight always answers `Good`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Rating {
        let weights = self.weights();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Rating::Good;
        }

        let mut pick = rng.gen::<f64>() * total;
        for (rating, weight) in Rating::ALL.iter().zip(weights.iter()) {
            if pick < *weight {
                return *rating;
            }
            pick -= weight;
        }
        // 浮点误差兜底: 返回最后一个正权重
        Rating::ALL
            .iter()
            .zip(weights.iter())
            .rev()
            .find(|(_, w)| **w > 0.0)
            .map(|(r, _)| *r)
            .unwrap_or(Rating::Good)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    pub reviewed_at: DateTime<Utc>,
    pub rating: Rating,
    pub state: MemoryState,
}

/// Run `reviews` consecutive reviews of one word, starting from a new state.
pub fn simulate(
    profile: &LearnerProfile,
    reviews: usize,
    seed: u64,
    start: DateTime<Utc>,
) -> Vec<SimulationStep> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = MemoryState::default();
    let mut now = start;
    let mut steps = Vec::with_capacity(reviews);

    for _ in 0..reviews {
        let rating = profile.sample(&mut rng);
        state = compute_next_review(&state, rating, now);
        steps.push(SimulationStep {
            reviewed_at: now,
            rating,
            state: state.clone(),
        });
        now = state.next_review_at.unwrap_or(now);
    }

    steps
}
