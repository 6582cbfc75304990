//! Service tier binary for the game data catalog.
//!
//! Exposes the public CRUD routes and forwards each call to the database
//! tier through a retrying, circuit-broken HTTP client.
//!
//! # Startup Sequence
//!
//! 1. Load `.env` if present
//! 2. Initialize structured logging (tracing)
//! 3. Load configuration from the environment
//! 4. Build one client and one resilience policy per downstream
//! 5. Serve until `Ctrl-C`

mod config;
mod error;

use catalog_api::config::ProcessEnv;
use catalog_api::{ServiceTier, build_service_router, start_server};
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ServiceError;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();
    catalog_api::telemetry::init_tracing(catalog_api::config::json_logs(&ProcessEnv));

    info!("catalog-service starting");

    let config = ServiceConfig::load(&ProcessEnv)?;
    let policy = &config.tier.policy;
    info!(
        port = config.server.port,
        weapon_database = %config.tier.database_urls.weapon,
        effect_service = %config.tier.effect_service_url,
        max_retries = policy.retry.max_retries,
        failure_threshold = policy.breaker.failure_threshold,
        break_duration_secs = policy.breaker.break_duration.as_secs(),
        "Configuration loaded"
    );

    let tier = ServiceTier::connect(&config.tier)?;
    start_server(&config.server, build_service_router(tier)).await?;

    info!("catalog-service stopped");
    Ok(())
}
