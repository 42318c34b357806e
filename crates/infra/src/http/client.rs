use std::time::Duration;

use async_trait::async_trait;
use mailsweep_core::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use mailsweep_domain::{Result, SweepError};
use reqwest::{Client as ReqwestClient, Method};
use tracing::debug;

use crate::errors::InfraError;

/// reqwest-backed [`HttpTransport`].
///
/// Performs exactly one exchange per call; retries belong to the
/// `BackoffExecutor` layered on top.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns `SweepError::Config` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    fn to_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = Self::to_method(request.method);
        let mut builder = self.client.request(method.clone(), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // POST without a payload still needs `Content-Length: 0`.
        builder = match (request.body, method == Method::POST) {
            (Some(body), _) => builder.body(body),
            (None, true) => builder.body(Vec::new()),
            (None, false) => builder,
        };

        let response = builder.send().await.map_err(|err| {
            debug!(%method, url = %request.url, error = %err, "HTTP request failed");
            SweepError::from(InfraError::from(err))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|err| SweepError::from(InfraError::from(err)))?;

        debug!(%method, url = %request.url, status, "received HTTP response");
        Ok(HttpResponse { status, headers, body })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl ReqwestTransportBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<ReqwestTransport> {
        let agent = self
            .user_agent
            .unwrap_or_else(|| format!("mailsweep/{}", env!("CARGO_PKG_VERSION")));
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(agent)
            .build()
            .map_err(|err| SweepError::from(InfraError::from(err)))?;

        Ok(ReqwestTransport { client })
    }
}
