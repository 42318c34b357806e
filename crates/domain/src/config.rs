//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BASE_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY,
    DEFAULT_INTER_BATCH_DELAY_MS, DEFAULT_JITTER_FRACTION, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE,
    DEFAULT_PREVIEW_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_URL, MAX_PAGE_SIZE,
    TOKEN_EXPIRY_MARGIN_SECS,
};
use crate::errors::{Result, SweepError};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub retry: RetrySettings,
    pub batch: BatchSettings,
    pub preview: PreviewSettings,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Mailbox root, e.g. `https://gmail.googleapis.com/gmail/v1/users/me`
    pub base_url: String,
    /// `maxResults` for enumeration pages (1..=500)
    pub page_size: u32,
    /// Transport-level timeout per request
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

/// Credential configuration
///
/// Either `access_token` or the refresh-token triple must be present for a
/// run to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_url: String,
    pub refresh_margin_secs: i64,
}

/// Backoff configuration for the request executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Upper bound of positive jitter as a fraction of the delay, in `[0, 1)`
    pub jitter_fraction: f64,
}

/// Pacing configuration for the batch engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub concurrency: usize,
    pub inter_batch_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            refresh_margin_secs: TOKEN_EXPIRY_MARGIN_SECS,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            jitter_fraction: DEFAULT_JITTER_FRACTION,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self { page_size: DEFAULT_PREVIEW_PAGE_SIZE }
    }
}

impl AuthConfig {
    /// True when a refresh-token grant can be performed.
    pub fn has_refresh_grant(&self) -> bool {
        self.client_id.is_some() && self.refresh_token.is_some()
    }
}

impl Config {
    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    /// Returns `SweepError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(SweepError::config("api.base_url must not be empty"));
        }
        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(SweepError::config(format!(
                "api.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.api.page_size
            )));
        }
        if self.batch.batch_size == 0 {
            return Err(SweepError::config("batch.batch_size must be greater than 0"));
        }
        if self.batch.concurrency == 0 {
            return Err(SweepError::config("batch.concurrency must be greater than 0"));
        }
        if !(0.0..1.0).contains(&self.retry.jitter_fraction) {
            return Err(SweepError::config(format!(
                "retry.jitter_fraction must be in [0, 1), got {}",
                self.retry.jitter_fraction
            )));
        }
        if self.preview.page_size == 0 {
            return Err(SweepError::config("preview.page_size must be greater than 0"));
        }
        if self.auth.refresh_margin_secs < 0 {
            return Err(SweepError::config("auth.refresh_margin_secs must not be negative"));
        }
        Ok(())
    }
}
