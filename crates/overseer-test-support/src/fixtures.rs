//! Ready-made games, actors and events.

use overseer_core::caller::Caller;
use overseer_core::event::{Event, EventOrigin, EventPayload, Interaction, NewGame};
use overseer_core::game::{Actor, Game};
use uuid::Uuid;

use crate::directory::{InMemoryActorDirectory, InMemoryGameDirectory};

/// A two-player game whose participants both resolve to known actors.
#[derive(Debug, Clone)]
pub struct GameFixture {
    /// The game.
    pub game: Game,
    /// The owning actor, also a participant.
    pub owner: Actor,
    /// A second participant.
    pub guest: Actor,
}

impl GameFixture {
    /// Builds an uninitialized game with two participants.
    #[must_use]
    pub fn new() -> Self {
        let owner = Actor {
            actor_id: Uuid::new_v4(),
            user_id: "user-owner".to_owned(),
            display_name: "Owner".to_owned(),
        };
        let guest = Actor {
            actor_id: Uuid::new_v4(),
            user_id: "user-guest".to_owned(),
            display_name: "Guest".to_owned(),
        };
        let game = Game {
            game_id: Uuid::new_v4(),
            name: "The Sunken Keep".to_owned(),
            owner_id: owner.actor_id,
            participants: vec![owner.actor_id, guest.actor_id],
            active_actor: None,
            initialized: false,
            completed: false,
        };
        Self { game, owner, guest }
    }

    /// A game directory containing only this game.
    #[must_use]
    pub fn games(&self) -> InMemoryGameDirectory {
        InMemoryGameDirectory::with_games([self.game.clone()])
    }

    /// An actor directory containing both participants.
    #[must_use]
    pub fn actors(&self) -> InMemoryActorDirectory {
        InMemoryActorDirectory::with_actors([self.owner.clone(), self.guest.clone()])
    }

    /// The owner's identity as a caller.
    #[must_use]
    pub fn owner_caller(&self) -> Caller {
        Caller::new(self.owner.user_id.clone(), Some(self.owner.actor_id))
    }
}

impl Default for GameFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A `NewGame` event from `actor_id` for `game_id`.
#[must_use]
pub fn new_game_event(game_id: Uuid, actor_id: Uuid) -> Event {
    Event {
        game_id,
        actor_id,
        payload: EventPayload::NewGame(NewGame {
            name: "The Sunken Keep".to_owned(),
        }),
        origin: EventOrigin::System,
    }
}

/// An `Interaction` event from `actor_id` for `game_id`.
#[must_use]
pub fn interaction_event(game_id: Uuid, actor_id: Uuid, message: &str) -> Event {
    Event {
        game_id,
        actor_id,
        payload: EventPayload::Interaction(Interaction {
            message: message.to_owned(),
        }),
        origin: EventOrigin::Discord {
            guild_id: "guild-1".to_owned(),
            channel_id: "channel-1".to_owned(),
        },
    }
}
