//! `PostgreSQL` implementation of `GameDirectory` and `ActorDirectory`.

use async_trait::async_trait;
use overseer_core::directory::{ActorDirectory, GameDirectory};
use overseer_core::error::DomainError;
use overseer_core::game::{Actor, Game};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{storage, storage_or_duplicate};

#[derive(Debug, sqlx::FromRow)]
struct GameRow {
    game_id: Uuid,
    name: String,
    owner_id: Uuid,
    active_actor: Option<Uuid>,
    initialized: bool,
    completed: bool,
}

impl GameRow {
    fn into_game(self, participants: Vec<Uuid>) -> Game {
        Game {
            game_id: self.game_id,
            name: self.name,
            owner_id: self.owner_id,
            participants,
            active_actor: self.active_actor,
            initialized: self.initialized,
            completed: self.completed,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActorRow {
    actor_id: Uuid,
    user_id: String,
    display_name: String,
}

impl From<ActorRow> for Actor {
    fn from(row: ActorRow) -> Self {
        Self {
            actor_id: row.actor_id,
            user_id: row.user_id,
            display_name: row.display_name,
        }
    }
}

/// PostgreSQL-backed game and actor directory.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Creates a new `PgDirectory`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a new actor.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyExists` if the actor id is taken.
    pub async fn create_actor(&self, actor: &Actor) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO actors (actor_id, user_id, display_name) VALUES ($1, $2, $3)")
            .bind(actor.actor_id)
            .bind(&actor.user_id)
            .bind(&actor.display_name)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_or_duplicate(e, || format!("actor {}", actor.actor_id)))?;
        Ok(())
    }

    /// Creates a new game together with its participant list.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyExists` if the game id is taken.
    pub async fn create_game(&self, game: &Game) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        sqlx::query(
            "INSERT INTO games (game_id, name, owner_id, active_actor, initialized, completed)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(game.game_id)
        .bind(&game.name)
        .bind(game.owner_id)
        .bind(game.active_actor)
        .bind(game.initialized)
        .bind(game.completed)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_or_duplicate(e, || format!("game {}", game.game_id)))?;
        insert_participants(&mut tx, game).await?;
        tx.commit().await.map_err(storage)?;
        Ok(())
    }
}

async fn insert_participants(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    game: &Game,
) -> Result<(), DomainError> {
    for (position, actor_id) in game.participants.iter().enumerate() {
        let position = i32::try_from(position).map_err(|e| DomainError::Internal(e.to_string()))?;
        sqlx::query(
            "INSERT INTO game_participants (game_id, actor_id, position) VALUES ($1, $2, $3)",
        )
        .bind(game.game_id)
        .bind(actor_id)
        .bind(position)
        .execute(&mut **tx)
        .await
        .map_err(storage)?;
    }
    Ok(())
}

#[async_trait]
impl GameDirectory for PgDirectory {
    async fn get_game(&self, game_id: Uuid) -> Result<Game, DomainError> {
        let row: GameRow = sqlx::query_as(
            "SELECT game_id, name, owner_id, active_actor, initialized, completed
             FROM games WHERE game_id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or_else(|| DomainError::NotFound(format!("game {game_id}")))?;

        let participants: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT actor_id FROM game_participants WHERE game_id = $1 ORDER BY position",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.into_game(participants.into_iter().map(|(id,)| id).collect()))
    }

    async fn save_game(&self, game: &Game) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let updated = sqlx::query(
            "UPDATE games
             SET name = $2, owner_id = $3, active_actor = $4, initialized = $5, completed = $6
             WHERE game_id = $1",
        )
        .bind(game.game_id)
        .bind(&game.name)
        .bind(game.owner_id)
        .bind(game.active_actor)
        .bind(game.initialized)
        .bind(game.completed)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        if updated.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("game {}", game.game_id)));
        }

        sqlx::query("DELETE FROM game_participants WHERE game_id = $1")
            .bind(game.game_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        insert_participants(&mut tx, game).await?;
        tx.commit().await.map_err(storage)?;

        debug!(game_id = %game.game_id, "game saved");
        Ok(())
    }
}

#[async_trait]
impl ActorDirectory for PgDirectory {
    async fn get_actor(&self, actor_id: Uuid) -> Result<Actor, DomainError> {
        let row: ActorRow = sqlx::query_as(
            "SELECT actor_id, user_id, display_name FROM actors WHERE actor_id = $1",
        )
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or_else(|| DomainError::NotFound(format!("actor {actor_id}")))?;
        Ok(row.into())
    }
}
