//! Test lock — scripted `ResourceLock` that records every call.

use std::sync::Mutex;

use async_trait::async_trait;
use overseer_core::claim::ClaimId;
use overseer_core::error::DomainError;
use overseer_core::lock::ResourceLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How a [`RecordingResourceLock`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockBehavior {
    /// Grant every acquire and confirm every release.
    Grant,
    /// Answer every acquire with `Ok(false)`.
    Deny,
    /// Fail every acquire with an internal (transport) error.
    FailAcquire,
    /// Grant acquires, fail every release with an internal error.
    FailRelease,
    /// Grant acquires, answer every release with `Ok(false)`.
    RejectRelease,
}

/// One call observed by a [`RecordingResourceLock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockCall {
    /// `acquire` was called.
    Acquire {
        /// Resource passed to the call.
        resource_id: Uuid,
        /// Claim passed to the call.
        claim_id: ClaimId,
        /// Whether the caller asked to wait.
        wait: bool,
    },
    /// `release` was called.
    Release {
        /// Resource passed to the call.
        resource_id: Uuid,
        /// Claim passed to the call.
        claim_id: ClaimId,
    },
}

/// A lock that answers according to a fixed [`LockBehavior`] and records
/// every call in order.
#[derive(Debug)]
pub struct RecordingResourceLock {
    behavior: LockBehavior,
    calls: Mutex<Vec<LockCall>>,
}

impl RecordingResourceLock {
    /// Creates a lock with the given behavior.
    #[must_use]
    pub fn new(behavior: LockBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every call made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<LockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `acquire` calls made so far.
    pub fn acquire_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LockCall::Acquire { .. }))
            .count()
    }

    /// Number of `release` calls made so far.
    pub fn release_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LockCall::Release { .. }))
            .count()
    }
}

#[async_trait]
impl ResourceLock for RecordingResourceLock {
    async fn acquire(
        &self,
        resource_id: Uuid,
        claim_id: &ClaimId,
        wait: bool,
        _cancel: &CancellationToken,
    ) -> Result<bool, DomainError> {
        self.calls.lock().unwrap().push(LockCall::Acquire {
            resource_id,
            claim_id: claim_id.clone(),
            wait,
        });
        match self.behavior {
            LockBehavior::Deny => Ok(false),
            LockBehavior::FailAcquire => Err(DomainError::Internal("lock service unreachable".into())),
            LockBehavior::Grant | LockBehavior::FailRelease | LockBehavior::RejectRelease => Ok(true),
        }
    }

    async fn release(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<bool, DomainError> {
        self.calls.lock().unwrap().push(LockCall::Release {
            resource_id,
            claim_id: claim_id.clone(),
        });
        match self.behavior {
            LockBehavior::FailRelease => Err(DomainError::Internal("lock service unreachable".into())),
            LockBehavior::RejectRelease => Ok(false),
            LockBehavior::Grant | LockBehavior::Deny | LockBehavior::FailAcquire => Ok(true),
        }
    }
}
