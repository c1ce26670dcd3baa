//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::{Database, MemoryUnitOfWork, Persistence};
use crate::repository::InMemoryUserStore;
use crate::service::{UserManager, UserService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    /// `None` when users live in memory
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create new app state.
    pub fn new(user_service: Arc<dyn UserService>, database: Option<Arc<Database>>) -> Self {
        Self {
            user_service,
            database,
        }
    }

    /// Wire the directory to a database.
    pub fn with_database(database: Database) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(uow));

        Self::new(user_service, Some(Arc::new(database)))
    }

    /// Wire the directory to a fresh in-memory store.
    pub fn in_memory() -> Self {
        let uow = Arc::new(MemoryUnitOfWork::new(Arc::new(InMemoryUserStore::new())));
        let user_service = Arc::new(UserManager::new(uow));

        Self::new(user_service, None)
    }
}
