//! Mapping from `sqlx` errors to `DomainError`.

use overseer_core::error::DomainError;

/// Maps any storage failure to `Internal`.
pub(crate) fn storage(err: sqlx::Error) -> DomainError {
    DomainError::Internal(format!("storage error: {err}"))
}

/// Maps a unique-key violation to `AlreadyExists` and anything else to
/// `Internal`.
pub(crate) fn storage_or_duplicate(err: sqlx::Error, what: impl FnOnce() -> String) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::AlreadyExists(what())
        }
        _ => storage(err),
    }
}

pub(crate) fn serialization(err: serde_json::Error) -> DomainError {
    DomainError::Internal(format!("serialization error: {err}"))
}
