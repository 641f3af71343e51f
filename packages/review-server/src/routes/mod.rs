mod health;
mod progress;
mod ratings;
mod reviews;
mod sessions;
mod wordbooks;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .route("/api/ratings", get(ratings::list))
        .route("/api/wordbooks/:set_id/words", post(wordbooks::register_words))
        .route("/api/progress", get(progress::stats).delete(progress::reset))
        .route("/api/progress/:word_id", get(progress::get_one))
        .route("/api/reviews", post(reviews::submit))
        .route("/api/reviews/due", get(reviews::due))
        .route("/api/sessions", post(sessions::start))
        .route("/api/sessions/:id", get(sessions::get_one))
        .route("/api/sessions/:id/finish", post(sessions::finish))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("接口不存在").into_response()
}

/// `None` for a missing or blank query value.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_user(user_id: Option<String>) -> Result<String, AppError> {
    non_blank(user_id).ok_or_else(|| AppError::validation("userId is required"))
}
