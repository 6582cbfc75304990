//! Service tier configuration, loaded from the environment.

use std::time::Duration;

use catalog_api::config::{self, Lookup};
use catalog_api::{ConfigError, DomainUrls, ServerConfig, ServiceTierConfig};
use catalog_resilience::{CircuitBreakerConfig, ResiliencePolicy, RetryPolicy};

/// Default listen port of the service tier.
const DEFAULT_PORT: u16 = 5000;

/// Default database tier location.
const DEFAULT_DATABASE_URL: &str = "http://127.0.0.1:5008";

/// Default per-request deadline in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Complete service tier configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Downstream locations and resilience policy.
    pub tier: ServiceTierConfig,
}

impl ServiceConfig {
    /// Load configuration.
    ///
    /// Variables:
    /// - `HOST` (default `0.0.0.0`), `PORT` (default `5000`)
    /// - `CATALOG_DATABASE_URL` -- database tier for every domain
    ///   (default `http://127.0.0.1:5008`)
    /// - `WEAPON_DATABASE_URL`, `ARMOUR_DATABASE_URL`, ... -- per-domain
    ///   overrides
    /// - `EFFECT_SERVICE_URL` -- effect service used for weapon enrichment
    ///   (default: this process)
    /// - `DOWNSTREAM_TIMEOUT_MS` (default 10000)
    /// - `RETRY_MAX_RETRIES` (default 3), `RETRY_BASE_DELAY_MS` (default 2000)
    /// - `BREAKER_FAILURE_THRESHOLD` (default 3),
    ///   `BREAKER_BREAK_DURATION_SECS` (default 30)
    pub fn load(env: &impl Lookup) -> Result<Self, ConfigError> {
        let server = config::server_config(env, DEFAULT_PORT)?;

        let shared = env
            .get("CATALOG_DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let domain = |prefix: &str| {
            env.get(&format!("{prefix}_DATABASE_URL"))
                .unwrap_or_else(|| shared.clone())
        };
        let database_urls = DomainUrls {
            weapon: domain("WEAPON"),
            armour: domain("ARMOUR"),
            jewellery: domain("JEWELLERY"),
            effect: domain("EFFECT"),
            feat: domain("FEAT"),
            attack: domain("ATTACK"),
            creature: domain("CREATURE"),
        };
        let effect_service_url = env
            .get("EFFECT_SERVICE_URL")
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", server.port));

        let timeout = Duration::from_millis(config::parsed_or(
            env,
            "DOWNSTREAM_TIMEOUT_MS",
            DEFAULT_TIMEOUT_MS,
        )?);
        let retry_defaults = RetryPolicy::default();
        let breaker_defaults = CircuitBreakerConfig::default();
        let policy = ResiliencePolicy {
            retry: RetryPolicy {
                max_retries: config::parsed_or(
                    env,
                    "RETRY_MAX_RETRIES",
                    retry_defaults.max_retries,
                )?,
                base_delay: Duration::from_millis(config::parsed_or(
                    env,
                    "RETRY_BASE_DELAY_MS",
                    u64::try_from(retry_defaults.base_delay.as_millis()).unwrap_or(u64::MAX),
                )?),
            },
            breaker: CircuitBreakerConfig {
                failure_threshold: config::parsed_or(
                    env,
                    "BREAKER_FAILURE_THRESHOLD",
                    breaker_defaults.failure_threshold,
                )?,
                break_duration: Duration::from_secs(config::parsed_or(
                    env,
                    "BREAKER_BREAK_DURATION_SECS",
                    breaker_defaults.break_duration.as_secs(),
                )?),
            },
            attempt_timeout: Some(timeout),
        };

        Ok(Self {
            server,
            tier: ServiceTierConfig {
                database_urls,
                effect_service_url,
                request_timeout: timeout,
                policy,
            },
        })
    }
}
