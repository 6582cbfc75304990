//! Environment lookup helpers shared by the tier binaries.
//!
//! Config loaders take a lookup function instead of reading the process
//! environment directly, so they can be exercised with a plain map.

use std::fmt::Display;
use std::str::FromStr;

use crate::server::ServerConfig;

/// Default bind host for both tiers.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(String),

    /// A variable is set but cannot be parsed.
    #[error("invalid {key}: {message}")]
    Invalid {
        /// The offending variable.
        key: String,
        /// Why it was rejected.
        message: String,
    },
}

/// A read-only view of configuration variables.
pub trait Lookup {
    /// The value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> Lookup for F {
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// The value of a required variable.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if `key` is unset or empty.
pub fn required(env: &impl Lookup, key: &str) -> Result<String, ConfigError> {
    env.get(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::Missing(key.to_owned()))
}

/// Parse `key`, falling back to `default` when it is unset.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the value is set but unparsable.
pub fn parsed_or<T>(env: &impl Lookup, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env.get(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e| ConfigError::Invalid {
            key: key.to_owned(),
            message: format!("{e}"),
        })
    })
}

/// `HOST` and `PORT`, with `default_port` when `PORT` is unset.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if `PORT` is not a valid port.
pub fn server_config(env: &impl Lookup, default_port: u16) -> Result<ServerConfig, ConfigError> {
    let host = env.get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
    let port = parsed_or(env, "PORT", default_port)?;
    Ok(ServerConfig::new(host, port))
}

/// Whether `LOG_FORMAT` asks for JSON log lines.
pub fn json_logs(env: &impl Lookup) -> bool {
    env.get("LOG_FORMAT")
        .is_some_and(|format| format.eq_ignore_ascii_case("json"))
}
