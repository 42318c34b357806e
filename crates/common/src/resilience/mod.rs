//! Resilience patterns for fault tolerance
//!
//! - **Backoff**: exponential delay schedule with positive jitter and
//!   `Retry-After` header interpretation

pub mod backoff;

pub use backoff::{
    parse_retry_after, BackoffError, BackoffPolicy, BackoffPolicyBuilder, BackoffResult,
};
