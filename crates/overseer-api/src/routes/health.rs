//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` while submissions are accepted, `shutting_down` afterwards.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Registered handlers in dispatch order.
    pub handlers: Vec<String>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.dispatcher.shutdown_token().is_cancelled() {
        "shutting_down"
    } else {
        "ok"
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        handlers: state
            .dispatcher
            .handler_names()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
