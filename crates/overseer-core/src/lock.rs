//! Per-resource mutual exclusion port.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::claim::ClaimId;
use crate::error::DomainError;

/// FIFO mutual exclusion scoped to an arbitrary resource id.
///
/// Implementations queue one ticket per `acquire` call and grant tickets in
/// creation order. There is no lease: a holder that never calls `release`
/// wedges the resource.
#[async_trait]
pub trait ResourceLock: Send + Sync {
    /// Queues a ticket for `claim_id` on `resource_id`.
    ///
    /// Returns `Ok(true)` once every earlier ticket for the resource has
    /// completed. With `wait == false` and earlier tickets outstanding,
    /// returns `Ok(false)` immediately and leaves the ticket queued. While
    /// waiting, cancellation of `cancel` ends the call with
    /// `DomainError::Cancelled`.
    async fn acquire(
        &self,
        resource_id: Uuid,
        claim_id: &ClaimId,
        wait: bool,
        cancel: &CancellationToken,
    ) -> Result<bool, DomainError>;

    /// Completes the ticket for `claim_id`. Returns `Ok(false)` if no such
    /// ticket exists for `resource_id`. Releasing twice is harmless.
    async fn release(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<bool, DomainError>;
}
