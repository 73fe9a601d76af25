//! Handler for `NewGame` events: initializes the game and hands the first
//! turn to its owner.

use std::sync::Arc;

use async_trait::async_trait;
use overseer_core::directory::GameDirectory;
use overseer_core::error::DomainError;
use overseer_core::event::{EventPayload, EventRecord};
use overseer_core::receipt::{Receipt, ReceiptEffect};
use tracing::{info, instrument};

use crate::application::receipt_stream::ReceiptStream;
use crate::domain::handler::EventHandler;

/// Registered name of [`NewGameHandler`].
pub const NEW_GAME_HANDLER: &str = "game.new";

/// Initializes a freshly created game.
pub struct NewGameHandler {
    games: Arc<dyn GameDirectory>,
}

impl NewGameHandler {
    /// Creates the handler over the given game directory.
    #[must_use]
    pub fn new(games: Arc<dyn GameDirectory>) -> Self {
        Self { games }
    }
}

impl std::fmt::Debug for NewGameHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewGameHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventHandler for NewGameHandler {
    fn name(&self) -> &str {
        NEW_GAME_HANDLER
    }

    fn predicate(&self, record: &EventRecord) -> Result<bool, DomainError> {
        Ok(matches!(record.payload(), EventPayload::NewGame(_)))
    }

    #[instrument(skip(self, record), fields(game_id = %record.game_id(), event_id = %record.event_id))]
    async fn handle(&self, record: &EventRecord) -> Result<ReceiptStream, DomainError> {
        let mut game = self.games.get_game(record.game_id()).await?;
        if game.initialized {
            return Err(DomainError::InvalidArgument(format!(
                "game {} is already initialized",
                game.game_id
            )));
        }

        game.initialized = true;
        game.active_actor = Some(game.owner_id);
        self.games.save_game(&game).await?;
        info!(owner = %game.owner_id, "game initialized");

        Ok(ReceiptStream::from_receipts(vec![
            Receipt::acknowledgement(
                game.game_id,
                record.event_id,
                Some("game created successfully".to_owned()),
            ),
            Receipt::new(
                game.game_id,
                record.event_id,
                ReceiptEffect::GameState(game.state_effect()),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use overseer_core::receipt::GameStateEffect;
    use overseer_test_support::{GameFixture, interaction_event, new_game_event};

    use super::*;

    #[tokio::test]
    async fn test_handle_initializes_game_and_yields_ack_then_state() {
        // Arrange
        let fixture = GameFixture::new();
        let games = Arc::new(fixture.games());
        let handler = NewGameHandler::new(games.clone());
        let record = EventRecord::new(
            new_game_event(fixture.game.game_id, fixture.owner.actor_id),
            Utc::now(),
        );

        // Act
        let receipts = handler.handle(&record).await.unwrap().collect_all().await;

        // Assert
        assert_eq!(receipts.len(), 2);
        assert_eq!(
            receipts[0].effect,
            ReceiptEffect::Acknowledgement {
                message: Some("game created successfully".to_owned())
            }
        );
        assert_eq!(
            receipts[1].effect,
            ReceiptEffect::GameState(GameStateEffect {
                initialized: true,
                completed: false,
                active_actor: Some(fixture.owner.actor_id),
            })
        );
        assert!(receipts.iter().all(|r| r.event_id == record.event_id));

        let saved = games.saved_games();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].initialized);
    }

    #[tokio::test]
    async fn test_handle_rejects_already_initialized_game() {
        // Arrange
        let mut fixture = GameFixture::new();
        fixture.game.initialized = true;
        let games = Arc::new(fixture.games());
        let handler = NewGameHandler::new(games.clone());
        let record = EventRecord::new(
            new_game_event(fixture.game.game_id, fixture.owner.actor_id),
            Utc::now(),
        );

        // Act
        let result = handler.handle(&record).await;

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert!(games.saved_games().is_empty());
    }

    #[test]
    fn test_predicate_only_accepts_new_game() {
        let fixture = GameFixture::new();
        let handler = NewGameHandler::new(Arc::new(fixture.games()));
        let new_game = EventRecord::new(
            new_game_event(fixture.game.game_id, fixture.owner.actor_id),
            Utc::now(),
        );
        let interaction = EventRecord::new(
            interaction_event(fixture.game.game_id, fixture.owner.actor_id, "hello"),
            Utc::now(),
        );

        assert!(handler.predicate(&new_game).unwrap());
        assert!(!handler.predicate(&interaction).unwrap());
    }
}
