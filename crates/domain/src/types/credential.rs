//! Bearer credential handed to every remote call

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// OAuth bearer token with an optional absolute expiry.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    pub fn new(secret: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { secret: secret.into(), expires_at }
    }

    /// Token that expires `lifetime_secs` from now.
    pub fn expiring_in(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        Self::new(secret, Some(Utc::now() + Duration::seconds(lifetime_secs)))
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.secret)
    }

    /// True when the token expires within `margin_secs` (or already has).
    /// Tokens without an expiry never expire.
    pub fn expires_within(&self, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(margin_secs) >= expires_at,
            None => false,
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let token = BearerToken::new("ya29.secret", None);
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("ya29"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn expiry_margin_is_respected() {
        let token = BearerToken::expiring_in("t", 20);
        assert!(token.expires_within(30));
        assert!(!token.expires_within(5));
        assert!(!BearerToken::new("t", None).expires_within(i64::from(u16::MAX)));
    }

    #[test]
    fn header_uses_bearer_scheme() {
        assert_eq!(BearerToken::new("abc", None).header_value(), "Bearer abc");
    }
}
