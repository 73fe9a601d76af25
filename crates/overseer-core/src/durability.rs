//! Durable, append-only recording of events and receipts.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::{Event, EventRecord};
use crate::receipt::Receipt;

/// Storage for submitted events and the receipts produced for them.
#[async_trait]
pub trait EventDurability: Send + Sync {
    /// Durably writes `event` and returns its record with a system id.
    async fn record_event(&self, event: &Event) -> Result<EventRecord, DomainError>;

    /// Durably writes `receipt`.
    ///
    /// Returns `DomainError::AlreadyExists` if a receipt with the same id was
    /// recorded before; every other failure is `DomainError::Internal`.
    async fn record_receipt(&self, receipt: &Receipt) -> Result<(), DomainError>;
}
