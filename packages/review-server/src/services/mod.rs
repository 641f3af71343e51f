pub mod review;
pub mod session;

pub use review::{get_progress, submit_review, ProgressView, ReviewError, ReviewOutcome, ReviewRequest};
pub use session::{RatingCounts, SessionError, SessionRegistry, SessionRetention, SessionSummary};
