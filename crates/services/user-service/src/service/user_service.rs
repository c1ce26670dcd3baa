//! User directory - validation, uniqueness and partial-update orchestration.
//!
//! Uniqueness is enforced twice: an existence pre-check gives a fast,
//! deterministic answer (username before email), and the storage unique
//! indexes reject whatever a concurrent writer slips past the pre-check.
//! Both surface as the same conflict errors.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{validate_create, validate_update, CreateUser, UpdateUser, UserField, UserResponse};

use crate::infra::{UnitOfWork, UserTransaction};

/// User directory operations consumed by the transport layer.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List every user in storage order
    async fn list_users(&self) -> AppResult<Vec<UserResponse>>;

    /// Get a user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse>;

    /// Create a user; `None` stands for an absent payload
    async fn create_user(&self, request: Option<CreateUser>) -> AppResult<UserResponse>;

    /// Apply the fields present in `request` to an existing user
    async fn update_user(&self, id: Uuid, request: UpdateUser) -> AppResult<UserResponse>;
}

/// Concrete implementation of UserService over a unit of work.
pub struct UserManager {
    uow: Arc<dyn UnitOfWork>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }
}

fn user_not_found(id: Uuid) -> String {
    format!("User with ID: {}", id)
}

/// Turn a storage-level unique rejection into the matching conflict.
fn storage_conflict(err: AppError, username: &str, email: &str) -> AppError {
    match err {
        AppError::UniqueViolation(UserField::Username) => {
            tracing::warn!(username, "Username rejected by storage constraint");
            AppError::UsernameConflict(username.to_string())
        }
        AppError::UniqueViolation(UserField::Email) => {
            tracing::warn!(email, "Email rejected by storage constraint");
            AppError::EmailConflict(email.to_string())
        }
        other => other,
    }
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged and the original error is returned.
async fn finish<T>(txn: Box<dyn UserTransaction>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

impl UserManager {
    async fn insert_unique(
        txn: &dyn UserTransaction,
        request: &CreateUser,
    ) -> AppResult<UserResponse> {
        let users = txn.users();

        if users.exists_by_username(&request.username).await? {
            tracing::warn!(username = %request.username, "Username already taken");
            return Err(AppError::UsernameConflict(request.username.clone()));
        }
        if users.exists_by_email(&request.email).await? {
            tracing::warn!(email = %request.email, "Email already taken");
            return Err(AppError::EmailConflict(request.email.clone()));
        }

        let user = users
            .insert(request.clone().into())
            .await
            .map_err(|e| storage_conflict(e, &request.username, &request.email))?;

        Ok(UserResponse::from(user))
    }

    async fn merge_unique(
        txn: &dyn UserTransaction,
        id: Uuid,
        request: &UpdateUser,
    ) -> AppResult<UserResponse> {
        let users = txn.users();

        let current = users.find_by_id(id).await?.ok_or_not_found(user_not_found(id))?;
        if request.is_empty() {
            return Ok(UserResponse::from(current));
        }

        // Only values that differ from the stored ones are checked and written.
        // A value equal to the current one is never a conflict, even though
        // the existence query would find this very record.
        let changes = UpdateUser {
            username: request.username.clone().filter(|u| *u != current.username),
            email: request.email.clone().filter(|e| *e != current.email),
        };

        if let Some(username) = changes.username.as_deref() {
            if users.exists_by_username(username).await? {
                tracing::warn!(username, "Username already taken");
                return Err(AppError::UsernameConflict(username.to_string()));
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if users.exists_by_email(email).await? {
                tracing::warn!(email, "Email already taken");
                return Err(AppError::EmailConflict(email.to_string()));
            }
        }

        if changes.is_empty() {
            return Ok(UserResponse::from(current));
        }

        let merged = current.with_changes(&changes);
        let saved = users
            .update(id, changes)
            .await
            .map_err(|e| storage_conflict(e, &merged.username, &merged.email))?;

        Ok(UserResponse::from(saved))
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.uow.users().find_all().await?;
        tracing::debug!(count = users.len(), "Listed users");

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse> {
        tracing::debug!(%id, "Fetching user");

        self.uow
            .users()
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_not_found(user_not_found(id))
    }

    async fn create_user(&self, request: Option<CreateUser>) -> AppResult<UserResponse> {
        let request = validate_create(request.as_ref())?;

        let txn = self.uow.begin().await?;
        let result = Self::insert_unique(txn.as_ref(), request).await;
        let created = finish(txn, result).await?;

        tracing::info!(id = %created.id, username = %created.username, "User created");
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, request: UpdateUser) -> AppResult<UserResponse> {
        validate_update(&request)?;

        let txn = self.uow.begin().await?;
        let result = Self::merge_unique(txn.as_ref(), id, &request).await;
        let updated = finish(txn, result).await?;

        tracing::info!(%id, "User updated");
        Ok(updated)
    }
}
