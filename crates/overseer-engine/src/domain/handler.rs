//! The handler abstraction.

use async_trait::async_trait;
use overseer_core::error::DomainError;
use overseer_core::event::EventRecord;

use crate::application::receipt_stream::ReceiptStream;

/// A named unit of event processing.
///
/// The dispatcher calls [`predicate`](Self::predicate) for every event and,
/// when it returns `Ok(true)`, calls [`handle`](Self::handle) while holding
/// the event's game lock. Handlers do not record their receipts; the
/// dispatcher records each one before delivering it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable name used in logs, claim ids and error receipts.
    fn name(&self) -> &str;

    /// Pure applicability test.
    ///
    /// # Errors
    ///
    /// An error is logged by the dispatcher and treated as "no match".
    fn predicate(&self, record: &EventRecord) -> Result<bool, DomainError>;

    /// Applies the event, mutating game state as needed, and returns the
    /// receipts it produced in production order.
    async fn handle(&self, record: &EventRecord) -> Result<ReceiptStream, DomainError>;
}
