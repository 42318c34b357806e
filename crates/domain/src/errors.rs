//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for mailsweep
///
/// Enumeration treats every variant as fatal. The batch engine downgrades
/// `Transport` and `Service` to per-item failures instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SweepError {
    /// Credential could not be obtained, or the service rejected it.
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Network-level failure that survived the retry budget.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Non-retryable HTTP status (including rate limits that outlived the
    /// retry budget).
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SweepError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth { message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service { status, message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable label for logs and exit summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Transport { .. } => "transport",
            Self::Service { status: 429, .. } => "rate_limited",
            Self::Service { .. } => "service",
            Self::Config { .. } => "config",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Cancelled => "cancelled",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for mailsweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_for_service_errors() {
        let err = SweepError::service(404, "message not found");
        assert_eq!(err.to_string(), "Service error (404): message not found");
    }

    #[test]
    fn labels_distinguish_rate_limits() {
        assert_eq!(SweepError::service(429, "slow down").label(), "rate_limited");
        assert_eq!(SweepError::service(500, "boom").label(), "service");
        assert_eq!(SweepError::auth("denied").label(), "auth");
        assert_eq!(SweepError::Cancelled.label(), "cancelled");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(SweepError::transport("reset")).unwrap();
        assert_eq!(json["type"], "Transport");
        assert_eq!(json["message"], "reset");
    }
}
