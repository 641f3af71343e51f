use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/info", get(info))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    start_time: String,
    uptime: u64,
}

async fn root(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "alive",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let start: DateTime<Utc> = state.started_at_system().into();
    Json(HealthInfoResponse {
        service: "danci-review",
        version: env!("CARGO_PKG_VERSION"),
        start_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
