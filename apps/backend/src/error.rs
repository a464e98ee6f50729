//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use repeat_core::EngineError;
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    /// Status code and machine-readable error type.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Engine(e) => match e {
                EngineError::LanguageNotFound(_) => (StatusCode::NOT_FOUND, "language_not_found"),
                EngineError::CategoryNotFound => (StatusCode::NOT_FOUND, "category_not_found"),
                EngineError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
                EngineError::WordNotFound(_) => (StatusCode::NOT_FOUND, "word_not_found"),
                EngineError::WordNotInSession(_) => (StatusCode::NOT_FOUND, "word_not_in_session"),
                EngineError::NoMoreWords => (StatusCode::NOT_FOUND, "no_more_words"),
                EngineError::NoEligibleWords => (StatusCode::NOT_FOUND, "no_words_available"),
                EngineError::SessionAlreadyExists(_) => (StatusCode::CONFLICT, "session_already_exists"),
                EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                EngineError::AccessDenied(_) => (StatusCode::FORBIDDEN, "forbidden"),
                EngineError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: EngineError) -> StatusCode {
        ApiError::from(error).into_response().status()
    }

    #[test]
    fn test_unauthorized_status() {
        let error = ApiError::Unauthorized("invalid token".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_not_found_statuses() {
        assert_eq!(status_of(EngineError::SessionNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(EngineError::NoMoreWords), StatusCode::NOT_FOUND);
        assert_eq!(status_of(EngineError::WordNotInSession(3)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(EngineError::CategoryNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_found_variants_are_distinguishable() {
        let codes = [
            ApiError::from(EngineError::SessionNotFound(1)).classify().1,
            ApiError::from(EngineError::NoMoreWords).classify().1,
            ApiError::from(EngineError::WordNotInSession(1)).classify().1,
            ApiError::from(EngineError::NoEligibleWords).classify().1,
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_already_exists_status() {
        assert_eq!(status_of(EngineError::SessionAlreadyExists(1)), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_status() {
        assert_eq!(
            status_of(EngineError::Validation("empty".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_access_denied_status() {
        assert_eq!(status_of(EngineError::AccessDenied(5)), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_storage_error_status() {
        assert_eq!(
            status_of(EngineError::storage("connection lost")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_migration_error_status() {
        let error = ApiError::Migration("migration failed".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display_unauthorized() {
        let error = ApiError::Unauthorized("invalid token".to_string());
        assert_eq!(error.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_error_display_engine() {
        let error = ApiError::from(EngineError::WordNotInSession(12));
        assert_eq!(error.to_string(), "word 12 is not part of the repeat session");
    }
}
