//! Retry around circuit breaker, applied to one logical call.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::ResiliencePolicy;
use crate::breaker::{BreakerListener, CircuitBreaker, CircuitOpenError};
use crate::retry::RetryPolicy;

/// Why an invoked call ultimately failed.
///
/// The variant reflects the final attempt: earlier attempts may have
/// failed for other reasons.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError<E> {
    /// The breaker rejected the final attempt without running it.
    #[error(transparent)]
    CircuitOpen(#[from] CircuitOpenError),

    /// The final attempt exceeded its deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The final attempt ran and failed.
    #[error("{0}")]
    Inner(E),
}

impl<E> InvokeError<E> {
    /// Whether the call was short-circuited by an open breaker.
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen(_))
    }
}

/// Resilience policy bound to one downstream.
///
/// Share one instance (behind an `Arc`) across every call to the same
/// downstream so the breaker sees all of them.
#[derive(Debug)]
pub struct ResilientInvoker {
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    attempt_timeout: Option<Duration>,
}

impl ResilientInvoker {
    /// Build an invoker for the downstream called `name`.
    pub fn new(name: impl Into<String>, policy: &ResiliencePolicy) -> Self {
        Self {
            breaker: CircuitBreaker::new(name, policy.breaker),
            retry: policy.retry,
            attempt_timeout: policy.attempt_timeout,
        }
    }

    /// Register a callback for breaker state transitions.
    #[must_use]
    pub fn with_listener(mut self, listener: BreakerListener) -> Self {
        self.breaker = self.breaker.with_listener(listener);
        self
    }

    /// The breaker guarding this downstream.
    pub const fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `operation` under the retry and breaker policy.
    ///
    /// `operation` is called once per admitted attempt. An `Err` from it,
    /// or an elapsed attempt deadline, is a failure: it counts against the
    /// breaker and triggers a retry while retries remain. Attempts rejected
    /// by an open breaker never call `operation` but still wait out the
    /// backoff before the next attempt.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt once retries are exhausted.
    pub async fn invoke<T, E, F, Fut>(&self, mut operation: F) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut retry: u32 = 0;
        loop {
            match self.attempt(&mut operation).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if retry >= self.retry.max_retries {
                        tracing::warn!(
                            downstream = self.breaker.name(),
                            attempts = retry.saturating_add(1),
                            %error,
                            "call failed after all retries"
                        );
                        return Err(error);
                    }
                    retry = retry.saturating_add(1);
                    let delay = self.retry.backoff(retry);
                    tracing::debug!(
                        downstream = self.breaker.name(),
                        retry,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt<T, E, F, Fut>(&self, operation: &mut F) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.breaker.try_acquire()?;

        let result = match self.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, operation()).await {
                Ok(outcome) => outcome.map_err(InvokeError::Inner),
                Err(_elapsed) => Err(InvokeError::Timeout(limit)),
            },
            None => operation().await.map_err(InvokeError::Inner),
        };

        if result.is_ok() {
            permit.succeed();
        } else {
            permit.fail();
        }
        result
    }
}
