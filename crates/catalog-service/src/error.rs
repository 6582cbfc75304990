//! Error types for the service tier binary.

/// Top-level error for the service tier binary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: catalog_api::ConfigError,
    },

    /// A downstream client could not be built.
    #[error("downstream error: {source}")]
    Downstream {
        /// The underlying client error.
        #[from]
        source: catalog_gateway::DownstreamError,
    },

    /// The HTTP server failed to start or stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: catalog_api::ServerError,
    },
}
