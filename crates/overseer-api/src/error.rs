//! Overseer — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use overseer_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            DomainError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_unauthenticated_maps_to_401() {
        assert_eq!(
            status_of(DomainError::Unauthenticated("no caller".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::NotFound("game".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_permission_denied_maps_to_403() {
        assert_eq!(
            status_of(DomainError::PermissionDenied("not a participant".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_invalid_argument_maps_to_400() {
        assert_eq!(
            status_of(DomainError::InvalidArgument("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_already_exists_maps_to_409() {
        assert_eq!(
            status_of(DomainError::AlreadyExists("receipt".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_cancelled_maps_to_503() {
        assert_eq!(
            status_of(DomainError::Cancelled("shutting down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_internal_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Internal("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
