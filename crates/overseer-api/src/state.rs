//! Shared application state.

use std::sync::Arc;

use overseer_engine::application::dispatcher::EventDispatcher;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The event dispatcher every submission goes through.
    pub dispatcher: Arc<EventDispatcher>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }
}
