//! Domain-level errors.
//!
//! These errors represent business rule violations detected without touching
//! storage. They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

use crate::validation::{UserField, Violation};

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed its shape rule
    #[error("Invalid {field}: {violation}")]
    Validation { field: UserField, violation: Violation },

    /// The payload itself is absent
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(field: UserField, violation: Violation) -> Self {
        DomainError::Validation { field, violation }
    }

    /// Create a malformed request error
    pub fn malformed(msg: impl Into<String>) -> Self {
        DomainError::MalformedRequest(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
