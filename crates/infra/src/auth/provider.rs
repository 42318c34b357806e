use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mailsweep_core::ports::CredentialProvider;
use mailsweep_domain::{AuthConfig, BearerToken, Result, SweepError};
use tokio::sync::Mutex;
use tracing::debug;

use super::source::{RefreshTokenSource, StaticTokenSource, TokenSource};

/// Caches the last token from `S` until it is within `margin_secs` of
/// expiry. Concurrent callers share a single refresh.
pub struct CachedCredentialProvider<S> {
    source: S,
    margin_secs: i64,
    cached: Mutex<Option<BearerToken>>,
}

impl<S: TokenSource> CachedCredentialProvider<S> {
    pub fn new(source: S, margin_secs: i64) -> Self {
        Self { source, margin_secs, cached: Mutex::new(None) }
    }
}

#[async_trait]
impl<S: TokenSource> CredentialProvider for CachedCredentialProvider<S> {
    async fn acquire(&self) -> Result<BearerToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.expires_within(self.margin_secs)) {
            return Ok(token.clone());
        }

        debug!("fetching new access token");
        let token = self.source.fetch().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Pick a credential provider for `auth`.
///
/// The refresh grant wins over a static access token when both are set.
///
/// # Errors
/// `SweepError::Config` when neither is configured.
pub fn credential_provider(
    auth: &AuthConfig,
    timeout: Duration,
) -> Result<Arc<dyn CredentialProvider>> {
    if let (Some(client_id), Some(client_secret), Some(refresh_token)) =
        (&auth.client_id, &auth.client_secret, &auth.refresh_token)
    {
        let source = RefreshTokenSource::new(
            auth.token_url.clone(),
            client_id.clone(),
            client_secret.clone(),
            refresh_token.clone(),
            timeout,
        )?;
        return Ok(Arc::new(CachedCredentialProvider::new(source, auth.refresh_margin_secs)));
    }

    match auth.access_token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => Ok(Arc::new(CachedCredentialProvider::new(
            StaticTokenSource::new(token.trim()),
            auth.refresh_margin_secs,
        ))),
        None => Err(SweepError::config(
            "no credentials configured: set MAILSWEEP_ACCESS_TOKEN or the client id, client secret and refresh token",
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingSource {
        lifetime_secs: i64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch(&self) -> Result<BearerToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BearerToken::expiring_in(format!("t{n}"), self.lifetime_secs))
        }
    }

    #[tokio::test]
    async fn reuses_token_until_near_expiry() {
        let provider = CachedCredentialProvider::new(
            CountingSource { lifetime_secs: 3600, calls: AtomicUsize::new(0) },
            30,
        );

        assert_eq!(provider.acquire().await.unwrap().secret(), "t0");
        assert_eq!(provider.acquire().await.unwrap().secret(), "t0");
        assert_eq!(provider.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refetches_inside_margin() {
        let provider = CachedCredentialProvider::new(
            CountingSource { lifetime_secs: 10, calls: AtomicUsize::new(0) },
            30,
        );

        assert_eq!(provider.acquire().await.unwrap().secret(), "t0");
        assert_eq!(provider.acquire().await.unwrap().secret(), "t1");
    }

    #[tokio::test]
    async fn static_token_is_selected() {
        let auth = AuthConfig { access_token: Some(" ya29.x ".into()), ..AuthConfig::default() };
        let provider = credential_provider(&auth, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.acquire().await.unwrap().secret(), "ya29.x");
    }

    #[test]
    fn missing_credentials_is_a_config_error() {
        let result = credential_provider(&AuthConfig::default(), Duration::from_secs(5));
        assert!(matches!(result, Err(SweepError::Config { .. })));
    }
}
