//! Circuit breaker state machine.
//!
//! - **Closed**: calls pass through; consecutive failures are counted
//! - **Open**: calls are rejected without touching the network
//! - **`HalfOpen`**: exactly one trial call is admitted
//!
//! Transitions happen under a mutex. Observers are notified after the lock
//! is released.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Default number of consecutive failures that opens the circuit.
const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default time the circuit stays open before admitting a trial call.
const DEFAULT_BREAK_DURATION_SECS: u64 = 30;

/// Breaker thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Cooldown before an open circuit admits a trial call.
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            break_duration: Duration::from_secs(DEFAULT_BREAK_DURATION_SECS),
        }
    }
}

/// Current breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls fail fast.
    Open,
    /// One trial call is allowed.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// A state transition, reported to the registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerEvent {
    /// The circuit opened (from closed or after a failed trial).
    Opened,
    /// The circuit closed after a successful trial.
    Reset,
    /// The cooldown elapsed and a trial call will be admitted.
    HalfOpen,
}

impl fmt::Display for BreakerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened => write!(f, "opened"),
            Self::Reset => write!(f, "reset"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Returned when the breaker rejects a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("circuit is open, retry after {retry_after:?}")]
pub struct CircuitOpenError {
    /// Time left until a trial call will be admitted.
    pub retry_after: Duration,
}

/// Callback invoked on every state transition.
pub type BreakerListener = Arc<dyn Fn(BreakerEvent) + Send + Sync>;

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Thread-safe circuit breaker shared by every call to one downstream.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
    listener: Option<BreakerListener>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Create a closed breaker. `name` identifies the downstream in logs.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
            listener: None,
        }
    }

    /// Register a callback for state transitions.
    #[must_use]
    pub fn with_listener(mut self, listener: BreakerListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Name of the downstream this breaker guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, without admitting or recording anything.
    ///
    /// An open circuit whose cooldown has elapsed reports `HalfOpen`; the
    /// transition itself happens on the next [`CircuitBreaker::try_acquire`].
    pub fn state(&self) -> CircuitState {
        let inner = self.lock();
        match (inner.state, inner.opened_at) {
            (CircuitState::Open, Some(opened_at))
                if opened_at.elapsed() >= self.config.break_duration =>
            {
                CircuitState::HalfOpen
            }
            (state, _) => state,
        }
    }

    /// Consecutive failures recorded while closed.
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Ask permission to make one call.
    ///
    /// The returned permit must be resolved with [`CallPermit::succeed`] or
    /// [`CallPermit::fail`]. Dropping it unresolved releases a half-open
    /// trial slot without changing state.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitOpenError`] when the circuit is open or a half-open
    /// trial is already in flight.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, CircuitOpenError> {
        let (decision, event) = {
            let mut inner = self.lock();
            let mut event = None;

            if inner.state == CircuitState::Open {
                let opened_at = inner.opened_at.unwrap_or_else(Instant::now);
                let elapsed = opened_at.elapsed();
                if elapsed >= self.config.break_duration {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = false;
                    event = Some(BreakerEvent::HalfOpen);
                } else {
                    let retry_after = self.config.break_duration.saturating_sub(elapsed);
                    return Err(CircuitOpenError { retry_after });
                }
            }

            let decision = match inner.state {
                CircuitState::Closed => Ok(false),
                CircuitState::HalfOpen if !inner.trial_in_flight => {
                    inner.trial_in_flight = true;
                    Ok(true)
                }
                CircuitState::HalfOpen | CircuitState::Open => Err(CircuitOpenError {
                    retry_after: Duration::ZERO,
                }),
            };
            (decision, event)
        };

        self.notify(event);
        decision.map(|trial| CallPermit {
            breaker: self,
            trial,
            resolved: false,
        })
    }

    fn record_success(&self, trial: bool) {
        let event = {
            let mut inner = self.lock();
            inner.consecutive_failures = 0;
            if trial {
                inner.trial_in_flight = false;
            }
            if inner.state == CircuitState::HalfOpen && trial {
                inner.state = CircuitState::Closed;
                inner.opened_at = None;
                Some(BreakerEvent::Reset)
            } else {
                None
            }
        };
        self.notify(event);
    }

    fn record_failure(&self, trial: bool) {
        let event = {
            let mut inner = self.lock();
            if trial {
                inner.trial_in_flight = false;
            }
            match inner.state {
                CircuitState::Closed => {
                    inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                    if inner.consecutive_failures >= self.config.failure_threshold {
                        inner.state = CircuitState::Open;
                        inner.opened_at = Some(Instant::now());
                        Some(BreakerEvent::Opened)
                    } else {
                        None
                    }
                }
                CircuitState::HalfOpen if trial => {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    Some(BreakerEvent::Opened)
                }
                // A call admitted before the circuit opened finished late.
                CircuitState::HalfOpen | CircuitState::Open => None,
            }
        };
        self.notify(event);
    }

    fn release_trial(&self) {
        self.lock().trial_in_flight = false;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: Option<BreakerEvent>) {
        let Some(event) = event else {
            return;
        };

        match event {
            BreakerEvent::Opened => tracing::warn!(
                breaker = %self.name,
                %event,
                threshold = self.config.failure_threshold,
                break_secs = self.config.break_duration.as_secs(),
                "circuit breaker opened"
            ),
            BreakerEvent::Reset | BreakerEvent::HalfOpen => {
                tracing::info!(breaker = %self.name, %event, "circuit breaker transition");
            }
        }

        if let Some(listener) = &self.listener {
            listener(event);
        }
    }
}

/// Permission to make one call through a [`CircuitBreaker`].
#[must_use = "a permit must be resolved with succeed() or fail()"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    resolved: bool,
}

impl CallPermit<'_> {
    /// Whether this permit is the half-open trial call.
    pub const fn is_trial(&self) -> bool {
        self.trial
    }

    /// Record that the call succeeded.
    pub fn succeed(mut self) {
        self.resolved = true;
        self.breaker.record_success(self.trial);
    }

    /// Record that the call failed.
    pub fn fail(mut self) {
        self.resolved = true;
        self.breaker.record_failure(self.trial);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.resolved && self.trial {
            self.breaker.release_trial();
        }
    }
}
