pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

/// Router over an in-memory progress store.
pub fn create_app(config: Config) -> axum::Router {
    app_with_state(AppState::in_memory(config))
}

pub fn app_with_state(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
