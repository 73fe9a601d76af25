//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod events;
pub mod health;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(events::router())
        .with_state(state)
}
