//! `PostgreSQL` implementation of the `EventDurability` trait.

use std::sync::Arc;

use async_trait::async_trait;
use overseer_core::clock::Clock;
use overseer_core::durability::EventDurability;
use overseer_core::error::DomainError;
use overseer_core::event::{Event, EventRecord};
use overseer_core::receipt::Receipt;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{serialization, storage, storage_or_duplicate};

/// PostgreSQL-backed event and receipt log.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgEventStore {
    /// Creates a new `PgEventStore`.
    #[must_use]
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Loads every receipt recorded for `event_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Internal` on a storage or decoding failure.
    pub async fn receipts_for_event(&self, event_id: Uuid) -> Result<Vec<Receipt>, DomainError> {
        let rows: Vec<(Uuid, Uuid, serde_json::Value)> = sqlx::query_as(
            "SELECT receipt_id, game_id, effect FROM event_receipts
             WHERE event_id = $1
             ORDER BY recorded_at, receipt_id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter()
            .map(|(receipt_id, game_id, effect)| {
                Ok(Receipt {
                    receipt_id,
                    game_id,
                    event_id,
                    effect: serde_json::from_value(effect).map_err(serialization)?,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for PgEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgEventStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventDurability for PgEventStore {
    async fn record_event(&self, event: &Event) -> Result<EventRecord, DomainError> {
        let record = EventRecord::new(event.clone(), self.clock.now());
        let origin = serde_json::to_value(&event.origin).map_err(serialization)?;
        let payload = serde_json::to_value(&event.payload).map_err(serialization)?;

        sqlx::query(
            "INSERT INTO event_records
                (event_id, game_id, actor_id, origin_type, origin, payload_type, payload, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.event_id)
        .bind(event.game_id)
        .bind(event.actor_id)
        .bind(event.origin.type_name())
        .bind(origin)
        .bind(event.payload.type_name())
        .bind(payload)
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_or_duplicate(e, || format!("event {}", record.event_id)))?;

        debug!(event_id = %record.event_id, game_id = %event.game_id, "event recorded");
        Ok(record)
    }

    async fn record_receipt(&self, receipt: &Receipt) -> Result<(), DomainError> {
        let effect = serde_json::to_value(&receipt.effect).map_err(serialization)?;

        sqlx::query(
            "INSERT INTO event_receipts (receipt_id, event_id, game_id, effect_type, effect)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(receipt.receipt_id)
        .bind(receipt.event_id)
        .bind(receipt.game_id)
        .bind(receipt.effect.type_name())
        .bind(effect)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_or_duplicate(e, || format!("receipt {}", receipt.receipt_id)))?;

        debug!(receipt_id = %receipt.receipt_id, event_id = %receipt.event_id, "receipt recorded");
        Ok(())
    }
}
