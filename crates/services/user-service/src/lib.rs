//! User Service Library
//!
//! A user directory with unique usernames and emails, exposed over a small
//! REST API. Storage is PostgreSQL through SeaORM, or an in-memory store for
//! local runs and tests.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::routes::create_router;
use crate::state::AppState;

/// Run the HTTP server.
///
/// `host` and `port` override the environment configuration when given.
pub async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    in_memory: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = UserServiceConfig::from_env();
    if let Some(host) = host {
        config.service.host = host;
    }
    if let Some(port) = port {
        config.service.port = port;
    }

    run_server_with_config(config, in_memory).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

async fn run_server_with_config(
    config: UserServiceConfig,
    in_memory: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = if in_memory {
        info!("Using in-memory user storage");
        AppState::in_memory()
    } else {
        info!(database = ?config.database, "Connecting to database");
        AppState::with_database(Database::connect(&config.database).await?)
    };

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!("{} listening on {}", config.service.service_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
