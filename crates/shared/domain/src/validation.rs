//! Validation policy for inbound user payloads.
//!
//! Checks are ordered: username before email, so the first reported
//! violation is deterministic.

use std::fmt;

use serde::Serialize;
use validator::{ValidateEmail, ValidateLength};

use crate::constants::{MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH, MISSING_CREATE_REQUEST};
use crate::error::{DomainError, DomainResult};
use crate::user::{CreateUser, UpdateUser};

/// Business-unique user attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserField {
    Username,
    Email,
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserField::Username => write!(f, "username"),
            UserField::Email => write!(f, "email"),
        }
    }
}

/// Kind of shape rule a field value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Empty or whitespace-only
    Blank,
    /// Character count outside `[min, max]`
    Length { min: usize, max: usize },
    /// Not a syntactically valid email address
    InvalidEmail,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Blank => write!(f, "must not be blank"),
            Violation::Length { min, max } => {
                write!(f, "length must be between {} and {} characters", min, max)
            }
            Violation::InvalidEmail => write!(f, "must be a well-formed email address"),
        }
    }
}

/// Check a username value: non-blank, 5 to 30 characters.
pub fn validate_username(value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(UserField::Username, Violation::Blank));
    }

    // Counted in characters, not bytes
    let in_bounds = value.validate_length(
        Some(MIN_USERNAME_LENGTH as u64),
        Some(MAX_USERNAME_LENGTH as u64),
        None,
    );
    if !in_bounds {
        return Err(DomainError::validation(
            UserField::Username,
            Violation::Length {
                min: MIN_USERNAME_LENGTH,
                max: MAX_USERNAME_LENGTH,
            },
        ));
    }

    Ok(())
}

/// Check an email value: non-blank, well-formed.
pub fn validate_email(value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(UserField::Email, Violation::Blank));
    }

    if !value.validate_email() {
        return Err(DomainError::validation(UserField::Email, Violation::InvalidEmail));
    }

    Ok(())
}

/// Validate a create payload. Both fields are mandatory.
///
/// An absent payload is a malformed request rather than a field violation.
pub fn validate_create(request: Option<&CreateUser>) -> DomainResult<&CreateUser> {
    let request = request.ok_or_else(|| DomainError::malformed(MISSING_CREATE_REQUEST))?;

    validate_username(&request.username)?;
    validate_email(&request.email)?;

    Ok(request)
}

/// Validate an update payload. Absent fields are skipped, present ones must
/// satisfy the same rules as on create.
pub fn validate_update(request: &UpdateUser) -> DomainResult<()> {
    if let Some(username) = request.username.as_deref() {
        validate_username(username)?;
    }
    if let Some(email) = request.email.as_deref() {
        validate_email(email)?;
    }

    Ok(())
}
