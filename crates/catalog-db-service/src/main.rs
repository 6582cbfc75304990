//! Database tier binary for the game data catalog.
//!
//! Serves the CRUD routes of every domain straight from a store.
//!
//! # Startup Sequence
//!
//! 1. Load `.env` if present
//! 2. Initialize structured logging (tracing)
//! 3. Load configuration from the environment
//! 4. Connect to `PostgreSQL` and apply migrations, or start empty
//!    in-memory stores
//! 5. Serve until `Ctrl-C`

mod config;
mod error;

use catalog_api::config::ProcessEnv;
use catalog_api::{DatabaseTier, build_database_router, start_server};
use catalog_db::PostgresPool;
use tracing::info;

use crate::config::DbServiceConfig;
use crate::error::DbServiceError;

#[tokio::main]
async fn main() -> Result<(), DbServiceError> {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();
    catalog_api::telemetry::init_tracing(catalog_api::config::json_logs(&ProcessEnv));

    info!("catalog-db-service starting");

    let config = DbServiceConfig::load(&ProcessEnv)?;
    info!(
        backend = ?config.backend,
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let pool = match &config.postgres {
        Some(postgres) => {
            let pool = PostgresPool::connect(postgres).await?;
            if config.run_migrations {
                pool.run_migrations().await?;
            }
            Some(pool)
        }
        None => None,
    };
    let tier = pool
        .as_ref()
        .map_or_else(DatabaseTier::memory, DatabaseTier::postgres);

    start_server(&config.server, build_database_router(tier)).await?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("catalog-db-service stopped");
    Ok(())
}
