//! In-memory `GameDirectory` and `ActorDirectory` implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use overseer_core::directory::{ActorDirectory, GameDirectory};
use overseer_core::error::DomainError;
use overseer_core::game::{Actor, Game};
use uuid::Uuid;

/// A game directory backed by a map. Records every `save_game` call.
#[derive(Debug, Default)]
pub struct InMemoryGameDirectory {
    games: Mutex<HashMap<Uuid, Game>>,
    saved: Mutex<Vec<Game>>,
}

impl InMemoryGameDirectory {
    /// Creates a directory containing `games`.
    #[must_use]
    pub fn with_games(games: impl IntoIterator<Item = Game>) -> Self {
        Self {
            games: Mutex::new(games.into_iter().map(|g| (g.game_id, g)).collect()),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every game passed to `save_game`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_games(&self) -> Vec<Game> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameDirectory for InMemoryGameDirectory {
    async fn get_game(&self, game_id: Uuid) -> Result<Game, DomainError> {
        self.games
            .lock()
            .unwrap()
            .get(&game_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("game {game_id}")))
    }

    async fn save_game(&self, game: &Game) -> Result<(), DomainError> {
        let mut games = self.games.lock().unwrap();
        if !games.contains_key(&game.game_id) {
            return Err(DomainError::NotFound(format!("game {}", game.game_id)));
        }
        games.insert(game.game_id, game.clone());
        self.saved.lock().unwrap().push(game.clone());
        Ok(())
    }
}

/// An actor directory backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryActorDirectory {
    actors: HashMap<Uuid, Actor>,
}

impl InMemoryActorDirectory {
    /// Creates a directory containing `actors`.
    #[must_use]
    pub fn with_actors(actors: impl IntoIterator<Item = Actor>) -> Self {
        Self {
            actors: actors.into_iter().map(|a| (a.actor_id, a)).collect(),
        }
    }
}

#[async_trait]
impl ActorDirectory for InMemoryActorDirectory {
    async fn get_actor(&self, actor_id: Uuid) -> Result<Actor, DomainError> {
        self.actors
            .get(&actor_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("actor {actor_id}")))
    }
}
