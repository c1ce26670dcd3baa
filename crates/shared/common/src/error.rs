//! Unified error handling.
//!
//! Provides a single error type for service operations that converts into
//! Axum HTTP responses. Internal details are logged, never sent to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, UserField, Violation};
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Request shape
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid {field}: {violation}")]
    Validation { field: UserField, violation: Violation },

    // Uniqueness
    #[error("User with username '{0}' already exists")]
    UsernameConflict(String),

    #[error("User with email '{0}' already exists")]
    EmailConflict(String),

    /// Raised by storage when a unique constraint rejects a write.
    /// The directory translates it into the matching conflict.
    #[error("Unique constraint on {0} violated")]
    UniqueViolation(UserField),

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<UserField>,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedRequest(_) => "MALFORMED_REQUEST",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::UsernameConflict(_) => "USERNAME_CONFLICT",
            AppError::EmailConflict(_) => "EMAIL_CONFLICT",
            AppError::UniqueViolation(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::UsernameConflict(_)
            | AppError::EmailConflict(_)
            | AppError::UniqueViolation(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            #[cfg(feature = "database")]
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Field the error refers to, if any
    pub fn field(&self) -> Option<UserField> {
        match self {
            AppError::Validation { field, .. } | AppError::UniqueViolation(field) => Some(*field),
            AppError::UsernameConflict(_) => Some(UserField::Username),
            AppError::EmailConflict(_) => Some(UserField::Email),
            _ => None,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            // Client errors carry their own message
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
                field: self.field(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, violation } => AppError::Validation { field, violation },
            DomainError::MalformedRequest(msg) => AppError::MalformedRequest(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(entity.into()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        AppError::MalformedRequest(msg.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_conflict_response() {
        let (status, body) = body_json(AppError::UsernameConflict("valid_username".into())).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "USERNAME_CONFLICT");
        assert_eq!(body["error"]["field"], "username");
        assert_eq!(
            body["error"]["message"],
            "User with username 'valid_username' already exists"
        );
    }

    #[tokio::test]
    async fn test_validation_response() {
        let err = AppError::from(DomainError::validation(UserField::Email, Violation::InvalidEmail));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "email");
    }

    #[cfg(feature = "database")]
    #[tokio::test]
    async fn test_database_details_hidden() {
        let err = AppError::from(sea_orm::DbErr::Custom("connection reset by peer".into()));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert_eq!(body["error"]["message"], "A database error occurred");
        assert!(body["error"].get("field").is_none());
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_not_found("User with ID: 42").unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "User with ID: 42 not found");
    }
}
