//! Game and actor lookup ports.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::game::{Actor, Game};

/// Lookup and persistence of games.
#[async_trait]
pub trait GameDirectory: Send + Sync {
    /// Loads a game. Returns `DomainError::NotFound` if it does not exist.
    async fn get_game(&self, game_id: Uuid) -> Result<Game, DomainError>;

    /// Overwrites the stored state of an existing game.
    async fn save_game(&self, game: &Game) -> Result<(), DomainError>;
}

/// Lookup of actors.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Loads an actor. Returns `DomainError::NotFound` if it does not exist.
    async fn get_actor(&self, actor_id: Uuid) -> Result<Actor, DomainError>;
}
