//! Error types for calls to a downstream tier.

/// Why a single downstream request failed.
///
/// Every variant counts as a failed attempt for retry and breaker
/// purposes.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// The configured base URL cannot carry path segments.
    #[error("Invalid downstream base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request never produced a response (refused, reset, timed out).
    #[error("Downstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The downstream answered outside the success range.
    #[error("Downstream returned {status}")]
    Status {
        /// The returned status code.
        status: reqwest::StatusCode,
    },

    /// The response body was not the expected JSON.
    #[error("Downstream response decode failed: {0}")]
    Decode(#[source] reqwest::Error),

    /// A request body could not be serialized.
    #[error("Request serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
}
