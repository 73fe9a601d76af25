//! In-process `ResourceLock` backed by a [`TicketTable`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use overseer_core::claim::ClaimId;
use overseer_core::clock::Clock;
use overseer_core::error::DomainError;
use overseer_core::lock::ResourceLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::config::LockConfig;
use crate::domain::ticket::TicketTable;

/// Polls `poll` with bounded backoff until it reports zero pending tickets.
///
/// `pending` is the count already observed by the caller. Cancellation is
/// checked while sleeping between polls.
///
/// # Errors
///
/// Returns `DomainError::Cancelled` if `cancel` fires first, or whatever
/// error `poll` returns.
pub async fn wait_for_turn<F, Fut>(
    config: &LockConfig,
    cancel: &CancellationToken,
    resource_id: Uuid,
    claim_id: &ClaimId,
    mut pending: u64,
    mut poll: F,
) -> Result<(), DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u64, DomainError>>,
{
    let mut backoff = config.backoff();
    while pending > 0 {
        let delay = backoff.next_delay();
        debug!(%resource_id, %claim_id, pending, ?delay, "waiting for lock");
        tokio::select! {
            () = cancel.cancelled() => {
                warn!(%resource_id, %claim_id, "lock wait cancelled");
                return Err(DomainError::Cancelled(format!(
                    "wait for resource {resource_id} cancelled"
                )));
            }
            () = tokio::time::sleep(delay) => {}
        }
        pending = poll().await?;
    }
    Ok(())
}

/// FIFO ticket lock held entirely in process memory.
pub struct InMemoryTicketLock {
    table: Mutex<TicketTable>,
    clock: Arc<dyn Clock>,
    config: LockConfig,
}

impl InMemoryTicketLock {
    /// Creates a lock with an empty ticket table.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, config: LockConfig) -> Self {
        Self {
            table: Mutex::new(TicketTable::new()),
            clock,
            config,
        }
    }

    /// Number of tickets currently holding `resource_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Internal` if the table mutex is poisoned.
    pub fn holders(&self, resource_id: Uuid) -> Result<usize, DomainError> {
        Ok(self.table()?.holders(resource_id))
    }

    fn table(&self) -> Result<MutexGuard<'_, TicketTable>, DomainError> {
        self.table
            .lock()
            .map_err(|e| DomainError::Internal(format!("ticket table poisoned: {e}")))
    }

    fn pending(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<u64, DomainError> {
        let count = self.table()?.pending(resource_id, claim_id)?;
        u64::try_from(count).map_err(|e| DomainError::Internal(e.to_string()))
    }
}

impl std::fmt::Debug for InMemoryTicketLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTicketLock")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ResourceLock for InMemoryTicketLock {
    async fn acquire(
        &self,
        resource_id: Uuid,
        claim_id: &ClaimId,
        wait: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        let now = self.clock.now();
        let ticket = self.table()?.insert(claim_id.clone(), resource_id, now)?;
        let pending = self.pending(resource_id, claim_id)?;

        if pending > 0 && !wait {
            // The queued ticket stays in the table and keeps counting as
            // pending for later claims until it is released.
            warn!(%resource_id, %claim_id, pending, "resource is locked");
            return Ok(false);
        }

        let waited = wait_for_turn(
            &self.config,
            cancel,
            resource_id,
            claim_id,
            pending,
            move || async move { self.pending(resource_id, claim_id) },
        )
        .await;
        if let Err(err) = waited {
            // Abandon the ticket so it never blocks the claims queued behind it.
            match self.table() {
                Ok(mut table) => {
                    table.complete(resource_id, claim_id);
                }
                Err(table_err) => {
                    error!(%resource_id, %claim_id, error = %table_err, "failed to abandon ticket");
                }
            }
            return Err(err);
        }

        self.table()?.mark_locked(resource_id, claim_id)?;
        info!(
            %resource_id,
            %claim_id,
            sequence = ticket.sequence,
            created_at = %ticket.created_at,
            "lock acquired"
        );
        Ok(true)
    }

    async fn release(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<bool, DomainError> {
        let released = self.table()?.complete(resource_id, claim_id);
        if released {
            info!(%resource_id, %claim_id, "lock released");
        } else {
            warn!(%resource_id, %claim_id, "release of unknown claim");
        }
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeDelta, TimeZone, Utc};
    use overseer_test_support::{FixedClock, SteppingClock};
    use tokio::sync::mpsc;

    use super::*;

    fn fast_lock() -> Arc<InMemoryTicketLock> {
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        Arc::new(InMemoryTicketLock::new(
            clock,
            LockConfig::new(Duration::from_millis(2), Duration::from_millis(10)),
        ))
    }

    #[tokio::test]
    async fn test_uncontended_acquire_is_granted_without_waiting() {
        // Arrange
        let lock = fast_lock();
        let game = Uuid::new_v4();
        let claim = ClaimId::from_raw("solo");
        let cancel = CancellationToken::new();

        // Act
        let granted = lock.acquire(game, &claim, false, &cancel).await.unwrap();

        // Assert
        assert!(granted);
        assert_eq!(lock.holders(game).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_wait_acquire_is_denied_while_earlier_ticket_is_incomplete() {
        // Arrange
        let lock = fast_lock();
        let game = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let holder = ClaimId::from_raw("holder");
        lock.acquire(game, &holder, false, &cancel).await.unwrap();

        // Act
        let granted = lock
            .acquire(game, &ClaimId::from_raw("late"), false, &cancel)
            .await
            .unwrap();

        // Assert
        assert!(!granted);
        assert_eq!(lock.holders(game).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_release_is_idempotent_and_unblocks_next_claim() {
        // Arrange
        let lock = fast_lock();
        let game = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let first = ClaimId::from_raw("first");
        lock.acquire(game, &first, false, &cancel).await.unwrap();

        // Act
        assert!(lock.release(game, &first).await.unwrap());
        assert!(lock.release(game, &first).await.unwrap());
        let granted = lock
            .acquire(game, &ClaimId::from_raw("second"), false, &cancel)
            .await
            .unwrap();

        // Assert
        assert!(granted);
        assert_eq!(lock.holders(game).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_release_of_unknown_claim_reports_false() {
        let lock = fast_lock();
        let released = lock
            .release(Uuid::new_v4(), &ClaimId::from_raw("ghost"))
            .await
            .unwrap();
        assert!(!released);
    }

    #[tokio::test]
    async fn test_reused_claim_id_is_rejected() {
        let lock = fast_lock();
        let game = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let claim = ClaimId::from_raw("reused");
        lock.acquire(game, &claim, false, &cancel).await.unwrap();

        let result = lock.acquire(game, &claim, true, &cancel).await;

        assert!(matches!(result, Err(DomainError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_waiters_are_granted_in_ticket_order() {
        // Arrange
        let lock = fast_lock();
        let game = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let holder = ClaimId::from_raw("holder");
        lock.acquire(game, &holder, false, &cancel).await.unwrap();

        let (granted_tx, mut granted_rx) = mpsc::unbounded_channel();
        let mut waiters = Vec::new();
        for name in ["second", "third"] {
            let lock = Arc::clone(&lock);
            let cancel = cancel.clone();
            let granted_tx = granted_tx.clone();
            let claim = ClaimId::from_raw(name);
            // Queue tickets one at a time so the insertion order is fixed.
            let (queued_tx, queued_rx) = tokio::sync::oneshot::channel();
            waiters.push(tokio::spawn(async move {
                let _ = queued_tx.send(());
                let granted = lock.acquire(game, &claim, true, &cancel).await.unwrap();
                assert!(lock.holders(game).unwrap() <= 1);
                granted_tx.send((name, granted)).unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
                lock.release(game, &claim).await.unwrap();
            }));
            queued_rx.await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // Act
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(granted_rx.try_recv().is_err());
        lock.release(game, &holder).await.unwrap();

        // Assert
        assert_eq!(granted_rx.recv().await.unwrap(), ("second", true));
        assert_eq!(granted_rx.recv().await.unwrap(), ("third", true));
        for waiter in waiters {
            waiter.await.unwrap();
        }
        assert_eq!(lock.holders(game).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clock_running_backwards_does_not_let_later_claim_jump_queue() {
        // Arrange
        let clock = Arc::new(SteppingClock::new(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            TimeDelta::seconds(-5),
        ));
        let lock = InMemoryTicketLock::new(clock, LockConfig::default());
        let game = Uuid::new_v4();
        let cancel = CancellationToken::new();
        lock.acquire(game, &ClaimId::from_raw("early"), false, &cancel)
            .await
            .unwrap();

        // Act
        let granted = lock
            .acquire(game, &ClaimId::from_raw("skewed"), false, &cancel)
            .await
            .unwrap();

        // Assert
        assert!(!granted);
    }

    #[tokio::test]
    async fn test_cancelled_wait_returns_error_and_abandons_ticket() {
        // Arrange
        let lock = fast_lock();
        let game = Uuid::new_v4();
        let root = CancellationToken::new();
        let holder = ClaimId::from_raw("holder");
        lock.acquire(game, &holder, false, &root).await.unwrap();

        let waiter_cancel = root.child_token();
        let waiter = {
            let lock = Arc::clone(&lock);
            let cancel = waiter_cancel.clone();
            tokio::spawn(async move {
                lock.acquire(game, &ClaimId::from_raw("waiter"), true, &cancel)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(15)).await;

        // Act
        waiter_cancel.cancel();
        let result = waiter.await.unwrap();

        // Assert
        assert!(matches!(result, Err(DomainError::Cancelled(_))));
        lock.release(game, &holder).await.unwrap();
        let granted = lock
            .acquire(game, &ClaimId::from_raw("after"), false, &root)
            .await
            .unwrap();
        assert!(granted);
    }
}
