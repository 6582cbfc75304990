//! Resilience policy for calls from the service tier to the database tier.
//!
//! Every outbound call goes through a [`ResilientInvoker`], which composes
//! an outer retry loop with an inner circuit breaker: each retry attempt
//! individually asks the breaker for permission.
//!
//! ```text
//! invoke(op)
//!   |-- attempt 1 --> breaker permit? --> op() (with deadline) --> record outcome
//!   |-- sleep 2s
//!   |-- attempt 2 --> ...
//!   |-- sleep 4s
//!   |-- attempt 3 --> ...
//!   |-- sleep 8s
//!   +-- attempt 4 --> ... --> last error
//! ```
//!
//! All timing uses [`tokio::time`], so tests can pause and drive the clock.
//!
//! # Modules
//!
//! - [`breaker`] -- the `Closed` / `Open` / `HalfOpen` state machine
//! - [`retry`] -- exponential backoff schedule
//! - [`invoker`] -- the composed policy and its error type

pub mod breaker;
pub mod invoker;
pub mod retry;

use std::time::Duration;

pub use breaker::{BreakerEvent, CircuitBreaker, CircuitBreakerConfig, CircuitOpenError, CircuitState};
pub use invoker::{InvokeError, ResilientInvoker};
pub use retry::RetryPolicy;

/// Default deadline for a single attempt.
const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 10;

/// Full policy for one downstream dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResiliencePolicy {
    /// Retry schedule applied per logical call.
    pub retry: RetryPolicy,
    /// Breaker thresholds shared by all calls to the downstream.
    pub breaker: CircuitBreakerConfig,
    /// Deadline for one attempt. `None` disables the per-attempt deadline.
    pub attempt_timeout: Option<Duration>,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            breaker: CircuitBreakerConfig::default(),
            attempt_timeout: Some(Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS)),
        }
    }
}
