use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::services::{self, ReviewRequest};
use crate::state::AppState;
use crate::store::DueQuery;

use super::{non_blank, require_user};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueParams {
    user_id: Option<String>,
    set_id: Option<String>,
    limit: Option<usize>,
}

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let outcome = services::submit_review(state.store(), state.sessions(), &request, Utc::now())?;
    Ok(ok(outcome))
}

pub async fn due(
    State(state): State<AppState>,
    params: Result<Query<DueParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params?;
    let query = DueQuery {
        user_id: require_user(params.user_id)?,
        set_id: non_blank(params.set_id),
        now: Utc::now(),
        limit: state.config().due_limit(params.limit),
    };

    let words = state.store().due(&query)?;
    Ok(ok(words))
}
