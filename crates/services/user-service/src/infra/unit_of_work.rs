//! Unit of Work pattern implementation.
//!
//! Every write operation of the directory runs its existence checks and its
//! write inside one unit of work, which is committed on success and rolled
//! back on any failure.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};

use crate::repository::{UserRepository, UserStore};
use common::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// User repository outside of any transaction, for reads
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Start a new unit of work
    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>>;
}

/// An open unit of work.
///
/// Dropping it without calling `commit` discards its writes.
#[async_trait]
pub trait UserTransaction: Send + Sync {
    /// User repository bound to this unit of work
    fn users(&self) -> &dyn UserRepository;

    /// Make all writes visible
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard all writes
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

// =============================================================================
// SeaORM
// =============================================================================

/// Database-backed UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        Self { db, user_repo }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>> {
        // ReadCommitted; the unique indexes settle races the pre-checks miss
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        Ok(Box::new(DatabaseUnit {
            users: UserStore::new(txn),
        }))
    }
}

/// Transaction-scoped repository access
struct DatabaseUnit {
    users: UserStore<DatabaseTransaction>,
}

#[async_trait]
impl UserTransaction for DatabaseUnit {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.users.into_inner().commit().await.map_err(AppError::from)
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.users.into_inner().rollback().await.map_err(AppError::from)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// UnitOfWork over a repository whose writes are individually atomic, such
/// as [`crate::repository::InMemoryUserStore`].
///
/// There is no isolation: commit and rollback are no-ops. The directory
/// issues at most one write per unit, so nothing is left half-applied.
pub struct MemoryUnitOfWork {
    user_repo: Arc<dyn UserRepository>,
}

impl MemoryUnitOfWork {
    /// Wrap an existing repository
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>> {
        Ok(Box::new(MemoryUnit {
            users: self.user_repo.clone(),
        }))
    }
}

struct MemoryUnit {
    users: Arc<dyn UserRepository>,
}

#[async_trait]
impl UserTransaction for MemoryUnit {
    fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
