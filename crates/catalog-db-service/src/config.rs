//! Database tier configuration, loaded from the environment.

use std::str::FromStr;
use std::time::Duration;

use catalog_api::config::{self, Lookup};
use catalog_api::{ConfigError, ServerConfig};
use catalog_db::PostgresConfig;

/// Default listen port of the database tier.
const DEFAULT_PORT: u16 = 5008;

/// Default maximum pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default pool acquire timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Where records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `PostgreSQL` tables.
    Postgres,
    /// Process memory, lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

/// Complete database tier configuration.
#[derive(Debug, Clone)]
pub struct DbServiceConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Store backend.
    pub backend: StoreBackend,
    /// Pool settings, present for the `PostgreSQL` backend.
    pub postgres: Option<PostgresConfig>,
    /// Whether to apply bundled migrations at startup.
    pub run_migrations: bool,
}

impl DbServiceConfig {
    /// Load configuration.
    ///
    /// Variables:
    /// - `HOST` (default `0.0.0.0`), `PORT` (default `5008`)
    /// - `STORE_BACKEND` -- `postgres` or `memory` (default `postgres`)
    /// - `DATABASE_URL` -- required for `postgres`
    /// - `DB_MAX_CONNECTIONS` (default 10)
    /// - `DB_CONNECT_TIMEOUT_SECS` (default 5)
    /// - `RUN_MIGRATIONS` (default `true`)
    pub fn load(env: &impl Lookup) -> Result<Self, ConfigError> {
        let server = config::server_config(env, DEFAULT_PORT)?;
        let backend = config::parsed_or(env, "STORE_BACKEND", StoreBackend::Postgres)?;

        let postgres = match backend {
            StoreBackend::Postgres => {
                let url = config::required(env, "DATABASE_URL")?;
                let max_connections =
                    config::parsed_or(env, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
                let connect_timeout_secs =
                    config::parsed_or(env, "DB_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;
                Some(
                    PostgresConfig::new(&url)
                        .with_max_connections(max_connections)
                        .with_connect_timeout(Duration::from_secs(connect_timeout_secs)),
                )
            }
            StoreBackend::Memory => None,
        };

        Ok(Self {
            server,
            backend,
            postgres,
            run_migrations: config::parsed_or(env, "RUN_MIGRATIONS", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<DbServiceConfig, ConfigError> {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        DbServiceConfig::load(&|key: &str| vars.get(key).map(|v| (*v).to_owned()))
    }

    #[test]
    fn postgres_backend_requires_a_database_url() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing(key)) if key == "DATABASE_URL"));
    }

    #[test]
    fn postgres_settings_are_read() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://catalog@localhost/catalog"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("RUN_MIGRATIONS", "false"),
        ]);
        let config = config.ok();
        let postgres = config.as_ref().and_then(|c| c.postgres.as_ref());
        assert_eq!(postgres.map(|p| p.max_connections), Some(4));
        assert_eq!(config.as_ref().map(|c| c.run_migrations), Some(false));
        assert_eq!(config.map(|c| c.server.port), Some(5008));
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = load(&[("STORE_BACKEND", "Memory"), ("PORT", "6000")]).ok();
        assert_eq!(config.as_ref().map(|c| c.backend), Some(StoreBackend::Memory));
        assert!(config.as_ref().is_some_and(|c| c.postgres.is_none()));
        assert_eq!(config.map(|c| c.server.port), Some(6000));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(matches!(
            load(&[("STORE_BACKEND", "mongo")]),
            Err(ConfigError::Invalid { key, .. }) if key == "STORE_BACKEND"
        ));
    }
}
