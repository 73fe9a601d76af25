//! Submitted events and their durable records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for a request to initialize a freshly created game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    /// Display name requested for the game.
    pub name: String,
}

/// Payload for an in-game interaction by an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Free-form message describing what the actor does or says.
    pub message: String,
}

/// Event type identifier for [`EventPayload::NewGame`].
pub const NEW_GAME_PAYLOAD_TYPE: &str = "new_game";

/// Event type identifier for [`EventPayload::Interaction`].
pub const INTERACTION_PAYLOAD_TYPE: &str = "interaction";

/// Exactly one of the supported payload kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Initialize a game.
    NewGame(NewGame),
    /// Act within a game.
    Interaction(Interaction),
}

impl EventPayload {
    /// Storage/routing name of this payload kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NewGame(_) => NEW_GAME_PAYLOAD_TYPE,
            Self::Interaction(_) => INTERACTION_PAYLOAD_TYPE,
        }
    }
}

/// Where an event entered the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventOrigin {
    /// Raised internally by the server.
    System,
    /// Relayed from a Discord guild channel.
    Discord {
        /// Guild the message arrived in.
        guild_id: String,
        /// Channel the message arrived in.
        channel_id: String,
    },
}

impl EventOrigin {
    /// Storage name of this origin.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Discord { .. } => "discord",
        }
    }
}

/// An intent submitted by an actor to affect a game. Immutable once
/// submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The game this event targets.
    pub game_id: Uuid,
    /// The actor that submitted the event.
    pub actor_id: Uuid,
    /// What the event asks for.
    pub payload: EventPayload,
    /// Where the event came from.
    pub origin: EventOrigin,
}

/// Durable form of an [`Event`], created exactly once per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// System-generated unique identifier.
    pub event_id: Uuid,
    /// When the event was written.
    pub recorded_at: DateTime<Utc>,
    /// The submitted event.
    pub event: Event,
}

impl EventRecord {
    /// Wraps `event` in a new record with a fresh time-ordered id.
    #[must_use]
    pub fn new(event: Event, recorded_at: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            recorded_at,
            event,
        }
    }

    /// The game the underlying event targets.
    #[must_use]
    pub fn game_id(&self) -> Uuid {
        self.event.game_id
    }

    /// The payload of the underlying event.
    #[must_use]
    pub fn payload(&self) -> &EventPayload {
        &self.event.payload
    }
}
