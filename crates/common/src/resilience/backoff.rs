//! Exponential backoff schedule with bounded positive jitter
//!
//! The delay for retry `n` (0-based) is `base_delay * 2^n` plus a random
//! amount drawn from `[0, jitter_fraction * that delay)`. A policy is only
//! constructed through [`BackoffPolicy::new`] or the builder, so every live
//! policy has a jitter fraction in `[0, 1)`.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Errors that can occur while building a backoff policy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackoffError {
    #[error("Invalid backoff configuration: {message}")]
    InvalidConfiguration { message: String },
}

pub type BackoffResult<T> = Result<T, BackoffError>;

/// Retry budget plus delay schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    jitter_fraction: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { max_retries: 6, base_delay: Duration::from_millis(500), jitter_fraction: 0.2 }
    }
}

impl BackoffPolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    /// Returns `BackoffError::InvalidConfiguration` when `jitter_fraction` is
    /// not a finite value in `[0, 1)`.
    pub fn new(max_retries: u32, base_delay: Duration, jitter_fraction: f64) -> BackoffResult<Self> {
        let policy = Self { max_retries, base_delay, jitter_fraction };
        policy.validate()?;
        Ok(policy)
    }

    pub fn builder() -> BackoffPolicyBuilder {
        BackoffPolicyBuilder::new()
    }

    /// A policy that never retries.
    pub fn no_retries() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    fn validate(&self) -> BackoffResult<()> {
        if !self.jitter_fraction.is_finite() || !(0.0..1.0).contains(&self.jitter_fraction) {
            return Err(BackoffError::InvalidConfiguration {
                message: format!(
                    "jitter_fraction must be in [0, 1), got {}",
                    self.jitter_fraction
                ),
            });
        }
        Ok(())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn jitter_fraction(&self) -> f64 {
        self.jitter_fraction
    }

    /// True while another retry fits in the budget after `attempt` retries.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Deterministic part of the delay: `base_delay * 2^attempt`, saturating.
    pub fn exponential_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Delay before retry `attempt`, jitter drawn from the thread RNG.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_with_rng(attempt, &mut rand::thread_rng())
    }

    /// Delay before retry `attempt` with a caller-supplied RNG.
    pub fn delay_with_rng<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let delay = self.exponential_delay(attempt);
        let upper = delay.as_secs_f64() * self.jitter_fraction;
        if upper <= 0.0 {
            return delay;
        }
        let jitter = Duration::try_from_secs_f64(rng.gen_range(0.0..upper)).unwrap_or_default();

        #[cfg(feature = "observability")]
        tracing::trace!(attempt, ?delay, ?jitter, "computed backoff delay");

        delay.saturating_add(jitter)
    }
}

/// Builder for [`BackoffPolicy`] with fluent API
#[derive(Debug)]
pub struct BackoffPolicyBuilder {
    policy: BackoffPolicy,
}

impl Default for BackoffPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BackoffPolicyBuilder {
    pub fn new() -> Self {
        Self { policy: BackoffPolicy::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.policy.max_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.policy.base_delay = delay;
        self
    }

    pub fn jitter_fraction(mut self, fraction: f64) -> Self {
        self.policy.jitter_fraction = fraction;
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.policy.jitter_fraction = 0.0;
        self
    }

    pub fn build(self) -> BackoffResult<BackoffPolicy> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}

/// Interpret a `Retry-After` header value as a delay in seconds.
///
/// Fractional values are honoured. Anything that is not a positive finite
/// number (including `0` and HTTP dates) collapses to one second so a server
/// hint never turns into a busy loop.
pub fn parse_retry_after(value: &str) -> Duration {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 => Duration::from_secs_f64(secs),
        _ => Duration::from_secs(1),
    }
}
