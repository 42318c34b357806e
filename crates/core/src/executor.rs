//! Backoff-aware request executor
//!
//! Wraps an [`HttpTransport`] and retries rate-limited responses and
//! transport failures according to a [`BackoffPolicy`]. Any other response,
//! successful or not, is handed back untouched so the caller can map the
//! status itself.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use mailsweep_common::resilience::{parse_retry_after, BackoffPolicy};
use mailsweep_domain::constants::RATE_LIMIT_REASON_MARKER;
use mailsweep_domain::{Result, SweepError};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ports::{HttpRequest, HttpResponse, HttpTransport};

/// Structured error body returned by Google APIs.
///
/// `{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED",
///   "errors": [{"reason": "rateLimitExceeded"}]}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    /// Absent when the body is some other JSON object.
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

/// The `error` member of an [`ErrorEnvelope`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// HTTP status echoed by the server
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    /// Canonical status name, e.g. `RESOURCE_EXHAUSTED`
    #[serde(default)]
    pub status: Option<String>,
    /// Per-cause details; the first one carries the reason we classify on.
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// One entry of `error.errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable reason, e.g. `userRateLimitExceeded`
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// Parse a response body; `None` when it is not a JSON object of this
    /// shape.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// `error.errors[0].reason`, falling back to `error.status`.
    pub fn reason(&self) -> Option<&str> {
        let error = self.error.as_ref()?;
        error
            .errors
            .first()
            .and_then(|detail| detail.reason.as_deref())
            .or(error.status.as_deref())
    }

    /// Human-readable message, when the body carries one.
    pub fn message(&self) -> Option<&str> {
        self.error.as_ref()?.message.as_deref()
    }

    /// True when the reason mentions a rate limit, in any casing.
    pub fn is_rate_limited(&self) -> bool {
        self.reason().is_some_and(|reason| {
            reason.to_ascii_lowercase().contains(RATE_LIMIT_REASON_MARKER)
        })
    }
}

/// Why the executor is about to sleep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryNotice {
    /// Server supplied `Retry-After`
    RetryAfter(Duration),
    /// Computed exponential delay including jitter
    Backoff(Duration),
    /// The transport failed; carries the error text
    TransportError(String),
}

impl fmt::Display for RetryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryAfter(delay) => write!(f, "Retry-after: {}s", delay.as_secs_f64()),
            Self::Backoff(delay) => write!(f, "backoff ~{}ms", delay.as_millis()),
            Self::TransportError(message) => write!(f, "transport error: {message}"),
        }
    }
}

/// Observer called with `(retry_number, notice)` before each sleep.
/// `retry_number` starts at 1.
pub type RetryObserver = Arc<dyn Fn(u32, &RetryNotice) + Send + Sync>;

/// Request executor with rate-limit detection and exponential backoff
#[derive(Clone)]
pub struct BackoffExecutor {
    transport: Arc<dyn HttpTransport>,
    policy: BackoffPolicy,
    observer: Option<RetryObserver>,
}

impl fmt::Debug for BackoffExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffExecutor")
            .field("policy", &self.policy)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl BackoffExecutor {
    /// Executor without a retry observer.
    pub fn new(transport: Arc<dyn HttpTransport>, policy: BackoffPolicy) -> Self {
        Self { transport, policy, observer: None }
    }

    /// Report every retry to `observer` before sleeping.
    #[must_use]
    pub fn with_observer(mut self, observer: RetryObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Send `request`, retrying while the response is rate limited or the
    /// transport fails and the retry budget allows it.
    ///
    /// # Returns
    /// The first response that is not retryable, or the last rate-limited
    /// response once the budget is spent.
    ///
    /// # Errors
    /// Returns the transport's `SweepError::Transport` after the budget is
    /// spent, or any non-transport error immediately.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut attempt: u32 = 0;

        loop {
            debug!(method = %request.method, url = %request.url, attempt, "sending request");

            let (delay, notice) = match self.transport.send(request.clone()).await {
                Ok(response) => {
                    if !Self::is_retryable(&response) || !self.policy.allows_retry(attempt) {
                        return Ok(response);
                    }
                    let (delay, notice) = self.response_delay(&response, attempt);
                    warn!(
                        status = response.status,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        url = %request.url,
                        "rate limited, retrying"
                    );
                    (delay, notice)
                }
                Err(SweepError::Transport { message }) if self.policy.allows_retry(attempt) => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        error = %message,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        url = %request.url,
                        "transport failure, retrying"
                    );
                    (delay, RetryNotice::TransportError(message))
                }
                Err(err) => return Err(err),
            };

            if let Some(observer) = &self.observer {
                observer(attempt + 1, &notice);
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// 429 always retries; 403 only with a rate-limit reason in the body.
    fn is_retryable(response: &HttpResponse) -> bool {
        match response.status {
            429 => true,
            403 => ErrorEnvelope::parse(&response.body).is_some_and(|e| e.is_rate_limited()),
            _ => false,
        }
    }

    fn response_delay(&self, response: &HttpResponse, attempt: u32) -> (Duration, RetryNotice) {
        match response.header("retry-after") {
            Some(value) => {
                let delay = parse_retry_after(value);
                (delay, RetryNotice::RetryAfter(delay))
            }
            None => {
                let delay = self.policy.delay_for(attempt);
                (delay, RetryNotice::Backoff(delay))
            }
        }
    }
}
