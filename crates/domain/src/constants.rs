//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Upper bound the enumeration endpoint accepts for `maxResults`.
pub const MAX_PAGE_SIZE: u32 = 500;
pub const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Backoff
pub const DEFAULT_MAX_RETRIES: u32 = 6;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_JITTER_FRACTION: f64 = 0.2;
/// Case-insensitive marker of a rate-limit reason in error bodies.
pub const RATE_LIMIT_REASON_MARKER: &str = "ratelimit";

// Batch engine
pub const DEFAULT_BATCH_SIZE: usize = 8;
pub const DEFAULT_CONCURRENCY: usize = 2;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 300;

// Preview
pub const DEFAULT_PREVIEW_PAGE_SIZE: usize = 10;
pub const NO_SENDER: &str = "(no sender)";
pub const NO_RECIPIENT: &str = "(no recipient)";
pub const NO_SUBJECT: &str = "(no subject)";

// Credentials
/// Cached tokens are refreshed this many seconds before they expire.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;
/// Lifetime assumed for tokens that arrive without `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
