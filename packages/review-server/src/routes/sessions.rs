use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::response::{created, ok, AppError};
use crate::state::AppState;

use super::{non_blank, require_user};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    user_id: Option<String>,
    set_id: Option<String>,
}

pub async fn start(
    State(state): State<AppState>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let user_id = require_user(payload.user_id)?;
    let summary = state
        .sessions()
        .start(&user_id, non_blank(payload.set_id), Utc::now());
    Ok(created(summary))
}

pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, AppError> {
    let id = session_id(id)?;
    let summary = state.sessions().summary(id, Utc::now())?;
    Ok(ok(summary))
}

pub async fn finish(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, AppError> {
    let id = session_id(id)?;
    let summary = state.sessions().finish(id, Utc::now())?;
    Ok(ok(summary))
}

fn session_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    id.map(|Path(id)| id)
        .map_err(|_| AppError::validation("session id must be a UUID"))
}
