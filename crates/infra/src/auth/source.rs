use std::time::Duration;

use async_trait::async_trait;
use mailsweep_domain::constants::DEFAULT_TOKEN_LIFETIME_SECS;
use mailsweep_domain::{BearerToken, Result, SweepError};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::errors::InfraError;

/// Something that can produce a fresh bearer token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<BearerToken>;
}

/// Pre-issued access token, assumed valid for the usual one-hour lifetime.
#[derive(Clone)]
pub struct StaticTokenSource {
    secret: String,
}

impl StaticTokenSource {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch(&self) -> Result<BearerToken> {
        Ok(BearerToken::expiring_in(self.secret.clone(), DEFAULT_TOKEN_LIFETIME_SECS))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth2 refresh-token grant against a token endpoint.
pub struct RefreshTokenSource {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl RefreshTokenSource {
    /// # Errors
    /// `SweepError::Config` if the HTTP client cannot be built.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SweepError::from(InfraError::from(err)))?;

        Ok(Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        })
    }
}

#[async_trait]
impl TokenSource for RefreshTokenSource {
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    async fn fetch(&self) -> Result<BearerToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|err| SweepError::from(InfraError::from(err)))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| SweepError::from(InfraError::from(err)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<OAuthError>(&body) {
                Ok(oauth) => match oauth.error_description {
                    Some(description) => format!("{}: {}", oauth.error, description),
                    None => oauth.error,
                },
                Err(_) => format!("token endpoint returned HTTP {}", status.as_u16()),
            };
            warn!(status = status.as_u16(), "token refresh rejected");
            return Err(SweepError::auth(format!("token refresh failed: {message}")));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| SweepError::auth(format!("malformed token response: {err}")))?;
        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        info!(expires_in = lifetime, "access token refreshed");

        Ok(BearerToken::expiring_in(token.access_token, lifetime))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn source(server: &MockServer) -> RefreshTokenSource {
        RefreshTokenSource::new(
            format!("{}/token", server.uri()),
            "client-id",
            "client-secret",
            "refresh-me",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn static_source_has_an_expiry() {
        let token = StaticTokenSource::new("abc").fetch().await.unwrap();
        assert_eq!(token.secret(), "abc");
        assert!(token.expires_at().is_some());
        assert!(!token.expires_within(60));
    }

    #[tokio::test]
    async fn refresh_posts_form_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-me"))
            .and(body_string_contains("client_id=client-id"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"fresh","expires_in":120,"token_type":"Bearer"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = source(&server).fetch().await.unwrap();

        assert_eq!(token.secret(), "fresh");
        assert!(token.expires_within(121));
        assert!(!token.expires_within(60));
    }

    #[tokio::test]
    async fn oauth_error_maps_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
            ))
            .mount(&server)
            .await;

        let err = source(&server).fetch().await.unwrap_err();

        match err {
            SweepError::Auth { message } => {
                assert!(message.contains("invalid_grant"));
                assert!(message.contains("revoked"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
