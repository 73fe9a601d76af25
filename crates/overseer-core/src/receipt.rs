//! Receipts: the recorded outcome of one handler's attempt on one event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which step of dispatch produced an error receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorEffectKind {
    /// The game lock could not be acquired.
    LockUnavailable,
    /// A handler returned an error or one of its receipts could not be
    /// recorded.
    HandlerFailed,
    /// The game lock could not be released.
    ReleaseFailed,
}

/// A failure reported on the receipt stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEffect {
    /// Human-readable description.
    pub message: String,
    /// Step that failed.
    pub kind: ErrorEffectKind,
}

/// Snapshot of the game after a handler changed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateEffect {
    /// Whether the game has been initialized.
    pub initialized: bool,
    /// Whether the game has ended.
    pub completed: bool,
    /// The actor whose turn it is, if any.
    pub active_actor: Option<Uuid>,
}

/// Something said in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtteranceEffect {
    /// Speaking actor; `None` for the narrator.
    pub speaker: Option<Uuid>,
    /// What was said.
    pub text: String,
}

/// Closed set of receipt outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReceiptEffect {
    /// The event was accepted.
    Acknowledgement {
        /// Optional note for the submitter.
        message: Option<String>,
    },
    /// Processing failed.
    Error(ErrorEffect),
    /// Game state changed.
    GameState(GameStateEffect),
    /// Someone spoke.
    Utterance(UtteranceEffect),
}

impl ReceiptEffect {
    /// Storage name of this effect kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Acknowledgement { .. } => "acknowledgement",
            Self::Error(_) => "error",
            Self::GameState(_) => "game_state",
            Self::Utterance(_) => "utterance",
        }
    }
}

/// Append-only outcome of one handler attempt on one event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique receipt identifier.
    pub receipt_id: Uuid,
    /// The game the event targeted.
    pub game_id: Uuid,
    /// The event record this receipt answers.
    pub event_id: Uuid,
    /// What happened.
    pub effect: ReceiptEffect,
}

impl Receipt {
    /// Creates a receipt with a fresh time-ordered id.
    #[must_use]
    pub fn new(game_id: Uuid, event_id: Uuid, effect: ReceiptEffect) -> Self {
        Self {
            receipt_id: Uuid::now_v7(),
            game_id,
            event_id,
            effect,
        }
    }

    /// Shorthand for an acknowledgement receipt.
    #[must_use]
    pub fn acknowledgement(game_id: Uuid, event_id: Uuid, message: Option<String>) -> Self {
        Self::new(game_id, event_id, ReceiptEffect::Acknowledgement { message })
    }

    /// Shorthand for an error receipt.
    #[must_use]
    pub fn error(
        game_id: Uuid,
        event_id: Uuid,
        kind: ErrorEffectKind,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            game_id,
            event_id,
            ReceiptEffect::Error(ErrorEffect {
                message: message.into(),
                kind,
            }),
        )
    }

    /// Returns the error effect, if this is an error receipt.
    #[must_use]
    pub fn as_error(&self) -> Option<&ErrorEffect> {
        match &self.effect {
            ReceiptEffect::Error(effect) => Some(effect),
            _ => None,
        }
    }
}
