//! Fixed, ordered set of event handlers.

use std::sync::Arc;

use overseer_core::event::EventRecord;
use tracing::{debug, warn};

use crate::domain::handler::EventHandler;

/// Immutable list of handlers assembled at startup.
///
/// Registration order is dispatch order.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    /// Creates a registry dispatching to `handlers` in the given order.
    #[must_use]
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self { handlers }
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Handler names in dispatch order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Handlers in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn EventHandler>> {
        self.handlers.iter()
    }
}

/// Runs `handler`'s predicate against `record`.
///
/// A predicate error is logged and counts as no match.
pub fn accepts(handler: &dyn EventHandler, record: &EventRecord) -> bool {
    match handler.predicate(record) {
        Ok(matched) => {
            debug!(
                handler = handler.name(),
                event_id = %record.event_id,
                matched,
                "predicate evaluated"
            );
            matched
        }
        Err(err) => {
            warn!(
                handler = handler.name(),
                event_id = %record.event_id,
                error = %err,
                "failed to evaluate predicate"
            );
            false
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use overseer_core::error::DomainError;
    use overseer_core::event::{EventPayload, EventRecord};
    use overseer_test_support::{interaction_event, new_game_event};
    use uuid::Uuid;

    use super::*;
    use crate::application::receipt_stream::ReceiptStream;

    struct PayloadHandler {
        name: &'static str,
        wants_new_game: bool,
    }

    #[async_trait]
    impl EventHandler for PayloadHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn predicate(&self, record: &EventRecord) -> Result<bool, DomainError> {
            Ok(matches!(record.payload(), EventPayload::NewGame(_)) == self.wants_new_game)
        }

        async fn handle(&self, _record: &EventRecord) -> Result<ReceiptStream, DomainError> {
            Ok(ReceiptStream::empty())
        }
    }

    struct BrokenPredicate;

    #[async_trait]
    impl EventHandler for BrokenPredicate {
        fn name(&self) -> &str {
            "broken"
        }

        fn predicate(&self, _record: &EventRecord) -> Result<bool, DomainError> {
            Err(DomainError::InvalidArgument("payload missing".into()))
        }

        async fn handle(&self, _record: &EventRecord) -> Result<ReceiptStream, DomainError> {
            Ok(ReceiptStream::empty())
        }
    }

    fn registry() -> HandlerRegistry {
        HandlerRegistry::new(vec![
            Arc::new(PayloadHandler {
                name: "setup",
                wants_new_game: true,
            }),
            Arc::new(BrokenPredicate),
            Arc::new(PayloadHandler {
                name: "play",
                wants_new_game: false,
            }),
            Arc::new(PayloadHandler {
                name: "audit",
                wants_new_game: true,
            }),
        ])
    }

    fn matching_names<'a>(registry: &'a HandlerRegistry, record: &EventRecord) -> Vec<&'a str> {
        registry
            .iter()
            .filter(|h| accepts(h.as_ref(), record))
            .map(|h| h.name())
            .collect()
    }

    #[test]
    fn test_matching_preserves_registration_order() {
        // Arrange
        let record = EventRecord::new(new_game_event(Uuid::new_v4(), Uuid::new_v4()), Utc::now());

        let registry = registry();

        // Act
        let names = matching_names(&registry, &record);

        // Assert
        assert_eq!(names, vec!["setup", "audit"]);
    }

    #[test]
    fn test_predicate_error_is_skipped_not_fatal() {
        let record = EventRecord::new(
            interaction_event(Uuid::new_v4(), Uuid::new_v4(), "look around"),
            Utc::now(),
        );
        let registry = registry();

        let names = matching_names(&registry, &record);

        assert_eq!(names, vec!["play"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
