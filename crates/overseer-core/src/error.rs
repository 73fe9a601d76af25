//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Variants follow the status taxonomy surfaced to callers of `submit`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No caller identity was present on the call.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The request was malformed or violates a domain rule.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced game, actor or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is known but may not act on the target.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A lock, storage or transport failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// A record with the same identifier was already written.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The operation's cancellation scope was cancelled while it waited.
    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl DomainError {
    /// Machine-readable code for this error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Internal(_) => "internal",
            Self::AlreadyExists(_) => "already_exists",
            Self::Cancelled(_) => "cancelled",
        }
    }
}
