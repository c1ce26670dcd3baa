//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum username length, in characters
pub const MIN_USERNAME_LENGTH: usize = 5;

/// Maximum username length, in characters
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Message reported when a create operation receives no payload
pub const MISSING_CREATE_REQUEST: &str = "User create request cannot be null";

/// Message reported when an update operation receives no payload
pub const MISSING_UPDATE_REQUEST: &str = "User update request cannot be null";

// =============================================================================
// Storage
// =============================================================================

/// Unique index over `users.username`
pub const USERNAME_UNIQUE_INDEX: &str = "uq_users_username";

/// Unique index over `users.email`
pub const EMAIL_UNIQUE_INDEX: &str = "uq_users_email";
