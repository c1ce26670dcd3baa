//! User repository: the persistence port and its SeaORM implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{NewUser, UpdateUser, User, UserField};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Implementations must enforce unique usernames and unique emails on
/// `insert` and `update`, reporting a rejected write as
/// [`AppError::UniqueViolation`]. Existence checks alone are advisory.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// List all users in storage order
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Check whether any user has this username
    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    /// Check whether any user has this email
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Insert a new user; storage assigns the identifier
    async fn insert(&self, user: NewUser) -> AppResult<User>;

    /// Write the fields present in `changes` to an existing user.
    ///
    /// Absent fields are not written, so concurrent updates of different
    /// fields do not undo each other. Returns the stored record.
    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;
}

/// SeaORM implementation of UserRepository.
///
/// Generic over the connection so the same queries run against the pool or
/// inside a [`sea_orm::DatabaseTransaction`].
pub struct UserStore<C = DatabaseConnection> {
    db: C,
}

impl<C> UserStore<C> {
    /// Create new repository instance
    pub fn new(db: C) -> Self {
        Self { db }
    }

    /// Give back the underlying connection
    pub fn into_inner(self) -> C {
        self.db
    }
}

#[async_trait]
impl<C> UserRepository for UserStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(user.username),
            email: Set(user.email),
        };

        let model = active_model.insert(&self.db).await.map_err(write_error)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: ActiveValue::Unchanged(id),
            username: changes.username.map_or(ActiveValue::NotSet, Set),
            email: changes.email.map_or(ActiveValue::NotSet, Set),
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::not_found(format!("User with ID: {}", id)),
            other => write_error(other),
        })?;

        Ok(User::from(model))
    }
}

/// Map a failed write, singling out unique index rejections.
fn write_error(err: DbErr) -> AppError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        if let Some(field) = violated_field(&detail) {
            return AppError::UniqueViolation(field);
        }
    }
    AppError::from(err)
}

/// Work out which column a unique violation refers to.
///
/// Postgres names the index (`uq_users_username`), SQLite names the column
/// (`users.username`); both contain the column name.
fn violated_field(detail: &str) -> Option<UserField> {
    if detail.contains("username") {
        Some(UserField::Username)
    } else if detail.contains("email") {
        Some(UserField::Email)
    } else {
        None
    }
}
