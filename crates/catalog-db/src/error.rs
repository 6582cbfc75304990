//! Error types for the database tier.
//!
//! Store operations return [`DbError`]. The [`DatabaseGateway`] logs these
//! and folds them into `bool` / `Option` results, so they never reach an
//! HTTP response directly.
//!
//! [`DatabaseGateway`]: crate::gateway::DatabaseGateway

/// Errors that can occur in the database tier.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An in-memory store ran out of identifiers for a resource.
    #[error("Identifier space exhausted for {0}")]
    IdExhausted(&'static str),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
