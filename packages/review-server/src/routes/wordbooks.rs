use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::{ok, AppError};
use crate::state::AppState;

const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWordsRequest {
    word_ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterWordsResponse {
    set_id: String,
    added: usize,
}

pub async fn register_words(
    State(state): State<AppState>,
    Path(set_id): Path<String>,
    payload: Result<Json<RegisterWordsRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;

    if payload.word_ids.is_empty() {
        return Err(AppError::validation("wordIds must be a non-empty array"));
    }
    if payload.word_ids.len() > MAX_BATCH_SIZE {
        return Err(AppError::validation(format!(
            "wordIds array exceeds maximum size of {MAX_BATCH_SIZE}"
        )));
    }

    let added = state.store().register_words(&set_id, &payload.word_ids)?;
    Ok(ok(RegisterWordsResponse { set_id, added }))
}
