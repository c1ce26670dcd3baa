//! User domain entity and its transfer shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User domain entity
///
/// `id` is assigned by storage on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl User {
    /// Build the record that results from applying a partial update.
    ///
    /// Absent fields keep their current value; the receiver is left untouched.
    pub fn with_changes(&self, changes: &UpdateUser) -> Self {
        Self {
            id: self.id,
            username: changes
                .username
                .clone()
                .unwrap_or_else(|| self.username.clone()),
            email: changes.email.clone().unwrap_or_else(|| self.email.clone()),
        }
    }
}

/// A user that has not been persisted yet (no identifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl From<CreateUser> for NewUser {
    fn from(request: CreateUser) -> Self {
        Self {
            username: request.username,
            email: request.email,
        }
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUser {
    /// Unique login name (5 to 30 characters)
    #[serde(alias = "userName")]
    #[cfg_attr(feature = "openapi", schema(example = "valid_username", min_length = 5, max_length = 30))]
    pub username: String,
    /// Unique email address
    #[cfg_attr(feature = "openapi", schema(example = "valid_email@example.com"))]
    pub email: String,
}

/// Partial update data transfer object
///
/// `None` means "leave unchanged"; there is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateUser {
    /// New username
    #[serde(default, alias = "userName", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(example = "new_username"))]
    pub username: Option<String>,
    /// New email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(example = "new@example.com"))]
    pub email: Option<String>,
}

impl UpdateUser {
    /// True when the request carries no field at all
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

/// User response (read-only projection returned to callers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    #[cfg_attr(feature = "openapi", schema(example = "ef428bb1-e5ae-441d-afb6-e8f5b5e7670a"))]
    pub id: Uuid,
    /// Login name
    #[cfg_attr(feature = "openapi", schema(example = "valid_username"))]
    pub username: String,
    /// Email address
    #[cfg_attr(feature = "openapi", schema(example = "valid_email@example.com"))]
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
