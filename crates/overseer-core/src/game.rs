//! Games and the actors that take part in them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::receipt::GameStateEffect;

/// The unit of mutual exclusion and narrative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Game identifier.
    pub game_id: Uuid,
    /// Display name.
    pub name: String,
    /// Actor that created the game.
    pub owner_id: Uuid,
    /// Actors declared as participants.
    pub participants: Vec<Uuid>,
    /// Actor whose turn it is.
    pub active_actor: Option<Uuid>,
    /// Set once the `game.new` handler has run.
    pub initialized: bool,
    /// Set when the game has ended.
    pub completed: bool,
}

impl Game {
    /// Whether `actor_id` is one of the declared participants.
    #[must_use]
    pub fn has_participant(&self, actor_id: Uuid) -> bool {
        self.participants.contains(&actor_id)
    }

    /// Snapshot of the mutable game state for a receipt.
    #[must_use]
    pub fn state_effect(&self) -> GameStateEffect {
        GameStateEffect {
            initialized: self.initialized,
            completed: self.completed,
            active_actor: self.active_actor,
        }
    }
}

/// A persona a user plays through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor identifier.
    pub actor_id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Name shown to other participants.
    pub display_name: String,
}
