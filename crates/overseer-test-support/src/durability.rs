//! Test durability — mock `EventDurability` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use overseer_core::durability::EventDurability;
use overseer_core::error::DomainError;
use overseer_core::event::{Event, EventRecord};
use overseer_core::receipt::Receipt;

/// Records every event and receipt it is given. Rejects a second receipt
/// with an id it has already seen with `DomainError::AlreadyExists`.
#[derive(Debug)]
pub struct RecordingEventDurability {
    recorded_at: DateTime<Utc>,
    events: Mutex<Vec<EventRecord>>,
    receipts: Mutex<Vec<Receipt>>,
}

impl RecordingEventDurability {
    /// Creates a recorder that stamps every record with `recorded_at`.
    #[must_use]
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            events: Mutex::new(Vec::new()),
            receipts: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded_events(&self) -> Vec<EventRecord> {
        self.events.lock().unwrap().clone()
    }

    /// Returns a snapshot of all recorded receipts, in recording order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded_receipts(&self) -> Vec<Receipt> {
        self.receipts.lock().unwrap().clone()
    }
}

impl Default for RecordingEventDurability {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[async_trait]
impl EventDurability for RecordingEventDurability {
    async fn record_event(&self, event: &Event) -> Result<EventRecord, DomainError> {
        let record = EventRecord::new(event.clone(), self.recorded_at);
        self.events.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn record_receipt(&self, receipt: &Receipt) -> Result<(), DomainError> {
        let mut receipts = self.receipts.lock().unwrap();
        if receipts.iter().any(|r| r.receipt_id == receipt.receipt_id) {
            return Err(DomainError::AlreadyExists(format!(
                "receipt {}",
                receipt.receipt_id
            )));
        }
        receipts.push(receipt.clone());
        Ok(())
    }
}

/// A durability layer that always fails with an internal error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventDurability;

#[async_trait]
impl EventDurability for FailingEventDurability {
    async fn record_event(&self, _event: &Event) -> Result<EventRecord, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn record_receipt(&self, _receipt: &Receipt) -> Result<(), DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }
}

/// Which receipts a [`ReceiptRejectingDurability`] refuses to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReceipts {
    /// Every receipt except error receipts.
    HandlerReceipts,
    /// Every receipt.
    All,
}

/// Records events normally but fails `record_receipt` with an internal error
/// for the receipts selected by [`RejectReceipts`].
#[derive(Debug)]
pub struct ReceiptRejectingDurability {
    inner: RecordingEventDurability,
    reject: RejectReceipts,
}

impl ReceiptRejectingDurability {
    /// Creates a double rejecting the `reject` receipts.
    #[must_use]
    pub fn new(reject: RejectReceipts) -> Self {
        Self {
            inner: RecordingEventDurability::default(),
            reject,
        }
    }

    /// Returns a snapshot of all recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded_events(&self) -> Vec<EventRecord> {
        self.inner.recorded_events()
    }

    /// Returns a snapshot of the receipts that were accepted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded_receipts(&self) -> Vec<Receipt> {
        self.inner.recorded_receipts()
    }
}

#[async_trait]
impl EventDurability for ReceiptRejectingDurability {
    async fn record_event(&self, event: &Event) -> Result<EventRecord, DomainError> {
        self.inner.record_event(event).await
    }

    async fn record_receipt(&self, receipt: &Receipt) -> Result<(), DomainError> {
        let rejected = match self.reject {
            RejectReceipts::HandlerReceipts => receipt.as_error().is_none(),
            RejectReceipts::All => true,
        };
        if rejected {
            return Err(DomainError::Internal("disk full".into()));
        }
        self.inner.record_receipt(receipt).await
    }
}
