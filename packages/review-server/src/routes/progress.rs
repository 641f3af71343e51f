use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::response::{ok, AppError};
use crate::services;
use crate::state::AppState;

use super::{non_blank, require_user};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    user_id: Option<String>,
    set_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetResponse {
    removed: usize,
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(word_id): Path<String>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let user_id = require_user(query.user_id)?;

    let view = services::get_progress(state.store(), &user_id, &word_id, Utc::now())?
        .ok_or_else(|| AppError::not_found(format!("no progress for word {word_id}")))?;
    Ok(ok(view))
}

pub async fn stats(
    State(state): State<AppState>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let user_id = require_user(query.user_id)?;
    let set_id = non_blank(query.set_id);

    let stats = state
        .store()
        .stats(&user_id, set_id.as_deref(), Utc::now())?;
    Ok(ok(stats))
}

/// Administrative "start learning again": stored states are dropped so every
/// matching word is scheduled from defaults on its next review.
pub async fn reset(
    State(state): State<AppState>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let user_id = require_user(query.user_id)?;
    let set_id = non_blank(query.set_id);

    let removed = state.store().reset(&user_id, set_id.as_deref())?;
    Ok(ok(ResetResponse { removed }))
}
