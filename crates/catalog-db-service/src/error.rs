//! Error types for the database tier binary.

/// Top-level error for the database tier binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum DbServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: catalog_api::ConfigError,
    },

    /// Connecting to or migrating the store failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying store error.
        #[from]
        source: catalog_db::DbError,
    },

    /// The HTTP server failed to start or stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: catalog_api::ServerError,
    },
}
