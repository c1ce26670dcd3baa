//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user entity, its transfer shapes and the validation policy applied to
//! inbound payloads.

pub mod constants;
pub mod error;
pub mod user;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use user::{CreateUser, NewUser, UpdateUser, User, UserResponse};
pub use validation::{validate_create, validate_update, UserField, Violation};
