//! `PostgreSQL` implementation of the `ResourceLock` trait.
//!
//! Tickets live in `resource_tickets`. The database assigns `created_at`
//! (`clock_timestamp()`) and `sequence` (`BIGSERIAL`), so ordering is shared
//! by every process using the same database.
//!
//! Ticket insertion is serialized per resource with a transaction-scoped
//! advisory lock. A ticket's order keys are fixed at INSERT but only become
//! visible at COMMIT; without the advisory lock a later ticket could commit
//! first, count zero pending tickets and lock alongside the earlier one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use overseer_core::claim::ClaimId;
use overseer_core::error::DomainError;
use overseer_core::lock::ResourceLock;
use overseer_lock::application::config::LockConfig;
use overseer_lock::application::ticket_lock::wait_for_turn;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{storage, storage_or_duplicate};

/// Table-backed FIFO ticket lock.
#[derive(Debug, Clone)]
pub struct PgTicketLock {
    pool: PgPool,
    config: LockConfig,
}

impl PgTicketLock {
    /// Creates a new `PgTicketLock`.
    #[must_use]
    pub fn new(pool: PgPool, config: LockConfig) -> Self {
        Self { pool, config }
    }

    /// Inserts a ticket while holding the resource's insertion lock and
    /// returns its order keys.
    async fn insert_ticket(
        &self,
        resource_id: Uuid,
        claim_id: &ClaimId,
    ) -> Result<(DateTime<Utc>, i64), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(resource_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        let keys: (DateTime<Utc>, i64) = sqlx::query_as(
            "INSERT INTO resource_tickets (claim_id, resource_id)
             VALUES ($1, $2)
             RETURNING created_at, sequence",
        )
        .bind(claim_id.as_str())
        .bind(resource_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| storage_or_duplicate(e, || format!("claim {claim_id}")))?;
        tx.commit().await.map_err(storage)?;
        Ok(keys)
    }

    async fn pending(
        &self,
        resource_id: Uuid,
        created_at: DateTime<Utc>,
        sequence: i64,
    ) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM resource_tickets
             WHERE resource_id = $1
               AND NOT completed
               AND (created_at, sequence) < ($2, $3)",
        )
        .bind(resource_id)
        .bind(created_at)
        .bind(sequence)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        u64::try_from(count).map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn complete(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE resource_tickets SET completed = TRUE, locked = FALSE
             WHERE resource_id = $1 AND claim_id = $2",
        )
        .bind(resource_id)
        .bind(claim_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ResourceLock for PgTicketLock {
    async fn acquire(
        &self,
        resource_id: Uuid,
        claim_id: &ClaimId,
        wait: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        let (created_at, sequence) = self.insert_ticket(resource_id, claim_id).await?;

        let pending = self.pending(resource_id, created_at, sequence).await?;
        if pending > 0 && !wait {
            warn!(%resource_id, %claim_id, pending, "resource is locked");
            return Ok(false);
        }

        let waited = wait_for_turn(
            &self.config,
            cancel,
            resource_id,
            claim_id,
            pending,
            move || self.pending(resource_id, created_at, sequence),
        )
        .await;
        if let Err(err) = waited {
            // Abandon the ticket so it never blocks the claims queued behind it.
            if let Err(complete_err) = self.complete(resource_id, claim_id).await {
                error!(
                    %resource_id,
                    %claim_id,
                    error = %complete_err,
                    "failed to abandon ticket"
                );
            }
            return Err(err);
        }

        sqlx::query("UPDATE resource_tickets SET locked = TRUE WHERE claim_id = $1")
            .bind(claim_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        info!(%resource_id, %claim_id, sequence, %created_at, "lock acquired");
        Ok(true)
    }

    async fn release(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<bool, DomainError> {
        let released = self.complete(resource_id, claim_id).await?;
        if released {
            info!(%resource_id, %claim_id, "lock released");
        } else {
            warn!(%resource_id, %claim_id, "release of unknown claim");
        }
        Ok(released)
    }
}
