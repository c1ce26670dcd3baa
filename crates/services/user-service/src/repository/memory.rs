//! In-memory user repository.
//!
//! Keeps users in insertion order. Both unique constraints are checked and
//! applied under a single write lock, so concurrent writers cannot both claim
//! the same username or email.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserRepository;
use common::{AppError, AppResult};
use domain::{NewUser, UpdateUser, User, UserField};

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Find the first unique constraint `candidate` would break, ignoring the
/// record with the same id.
fn conflicting_field(
    users: &[User],
    candidate_id: Option<Uuid>,
    username: &str,
    email: &str,
) -> Option<UserField> {
    let others: Vec<&User> = users.iter().filter(|u| Some(u.id) != candidate_id).collect();

    if others.iter().any(|u| u.username == username) {
        Some(UserField::Username)
    } else if others.iter().any(|u| u.email == email) {
        Some(UserField::Email)
    } else {
        None
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.clone())
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        if let Some(field) = conflicting_field(&users, None, &user.username, &user.email) {
            return Err(AppError::UniqueViolation(field));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
        };
        users.push(created.clone());

        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        // Merge against the record as it is now, under the lock
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(format!("User with ID: {}", id)))?;
        let updated = users[index].with_changes(&changes);

        if let Some(field) = conflicting_field(&users, Some(id), &updated.username, &updated.email) {
            return Err(AppError::UniqueViolation(field));
        }

        users[index] = updated.clone();
        Ok(updated)
    }
}
