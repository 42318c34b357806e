//! Configuration loading and management
//!
//! This module provides utilities for loading application configuration
//! from environment variables and files.

pub mod loader;

use std::time::Duration;

use mailsweep_common::resilience::BackoffPolicy;
use mailsweep_domain::{Result, RetrySettings, SweepError};

use crate::errors::InfraError;
// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, load_with, probe_config_paths};

/// Executor policy for the configured retry settings.
///
/// # Errors
/// `SweepError::Config` when the jitter fraction is outside `[0, 1)`.
pub fn backoff_policy(settings: &RetrySettings) -> Result<BackoffPolicy> {
    BackoffPolicy::builder()
        .max_retries(settings.max_retries)
        .base_delay(Duration::from_millis(settings.base_delay_ms))
        .jitter_fraction(settings.jitter_fraction)
        .build()
        .map_err(|err| SweepError::from(InfraError::from(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_retry_settings() {
        let policy = backoff_policy(&RetrySettings {
            max_retries: 3,
            base_delay_ms: 250,
            jitter_fraction: 0.1,
        })
        .unwrap();

        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.base_delay(), Duration::from_millis(250));
    }

    #[test]
    fn rejects_out_of_range_jitter() {
        let result = backoff_policy(&RetrySettings { jitter_fraction: 1.5, ..RetrySettings::default() });
        assert!(matches!(result, Err(SweepError::Config { .. })));
    }
}
