//! Gmail v1 REST adapter for the mailbox port
//!
//! Listing, trashing, metadata previews and the account profile, all sent
//! through a [`BackoffExecutor`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mailsweep_core::ports::{HttpRequest, HttpResponse, MailboxGateway};
use mailsweep_core::{BackoffExecutor, ErrorEnvelope, RetryObserver};
use mailsweep_domain::{
    BearerToken, Config, MailboxProfile, MessageId, MessagePage, MessagePreview, PageToken,
    Result, SweepError,
};
use tracing::{debug, instrument};

use super::dto::{ListMessagesResponse, MessageMetadata, ProfileResponse};
use crate::config::backoff_policy;
use crate::http::ReqwestTransport;

const METADATA_HEADERS: [&str; 4] = ["From", "To", "Subject", "Date"];

/// [`MailboxGateway`] speaking the Gmail v1 REST API.
///
/// Every call goes through the [`BackoffExecutor`]; whatever it hands back
/// unsuccessful is final and mapped onto `SweepError` here.
#[derive(Debug)]
pub struct GmailGateway {
    executor: BackoffExecutor,
    base_url: String,
}

impl GmailGateway {
    /// `base_url` is the per-user root, e.g. `.../gmail/v1/users/me`.
    pub fn new(executor: BackoffExecutor, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { executor, base_url }
    }

    /// Per-user API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn message_url(&self, id: &MessageId) -> String {
        format!("{}/messages/{}", self.base_url, urlencoding::encode(id.as_str()))
    }

    async fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.executor.execute(&request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(status_error(&response))
        }
    }
}

/// Map a terminal non-success response onto the domain error.
fn status_error(response: &HttpResponse) -> SweepError {
    let envelope = ErrorEnvelope::parse(&response.body);
    let detail = envelope
        .as_ref()
        .and_then(|e| e.message().or_else(|| e.reason()))
        .map(str::to_string)
        .unwrap_or_else(|| response.body.chars().take(200).collect());

    match response.status {
        401 => SweepError::auth(format!("credential rejected: {detail}")),
        status => SweepError::service(status, detail),
    }
}

#[async_trait]
impl MailboxGateway for GmailGateway {
    #[instrument(skip(self, token, page_token), fields(has_cursor = page_token.is_some()))]
    async fn list_page(
        &self,
        token: &BearerToken,
        query: &str,
        page_size: u32,
        page_token: Option<&PageToken>,
    ) -> Result<MessagePage> {
        let mut request = HttpRequest::get(format!("{}/messages", self.base_url))
            .bearer(token)
            .query("q", query)
            .query("maxResults", page_size.to_string());
        if let Some(cursor) = page_token {
            request = request.query("pageToken", cursor.as_str());
        }

        let page: MessagePage = self.call(request).await?.json::<ListMessagesResponse>()?.into();
        debug!(ids = page.ids.len(), last = page.next_page_token.is_none(), "listed page");
        Ok(page)
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn trash(&self, token: &BearerToken, id: &MessageId) -> Result<()> {
        let request = HttpRequest::post(format!("{}/trash", self.message_url(id))).bearer(token);
        self.call(request).await.map(|_| ())
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn fetch_preview(&self, token: &BearerToken, id: &MessageId) -> Result<MessagePreview> {
        let request = METADATA_HEADERS.iter().fold(
            HttpRequest::get(self.message_url(id)).bearer(token).query("format", "metadata"),
            |request, name| request.query("metadataHeaders", *name),
        );

        let metadata: MessageMetadata = self.call(request).await?.json()?;
        Ok(metadata.into_preview(id))
    }

    #[instrument(skip(self, token))]
    async fn profile(&self, token: &BearerToken) -> Result<MailboxProfile> {
        let request = HttpRequest::get(format!("{}/profile", self.base_url)).bearer(token);
        let profile: ProfileResponse = self.call(request).await?.json()?;
        Ok(profile.into())
    }
}

/// Assemble transport, executor and gateway from configuration.
///
/// # Errors
/// `SweepError::Config` for invalid retry settings or a client that cannot
/// be built.
pub fn gateway_from_config(
    config: &Config,
    observer: Option<RetryObserver>,
) -> Result<Arc<GmailGateway>> {
    let mut builder =
        ReqwestTransport::builder().timeout(Duration::from_secs(config.api.timeout_secs));
    if let Some(agent) = &config.api.user_agent {
        builder = builder.user_agent(agent.clone());
    }
    let transport = Arc::new(builder.build()?);

    let mut executor = BackoffExecutor::new(transport, backoff_policy(&config.retry)?);
    if let Some(observer) = observer {
        executor = executor.with_observer(observer);
    }

    Ok(Arc::new(GmailGateway::new(executor, config.api.base_url.clone())))
}

#[cfg(test)]
mod tests {
    use mailsweep_common::resilience::BackoffPolicy;
    use mailsweep_core::testing::MockTransport;

    use super::*;

    const BASE: &str = "https://mail.test/gmail/v1/users/me";

    fn gateway(transport: Arc<MockTransport>) -> GmailGateway {
        GmailGateway::new(BackoffExecutor::new(transport, BackoffPolicy::no_retries()), BASE)
    }

    fn token() -> BearerToken {
        BearerToken::new("tok", None)
    }

    #[tokio::test]
    async fn list_page_sends_query_and_cursor() {
        let transport = Arc::new(MockTransport::new());
        let url = format!("{BASE}/messages");
        transport.push_response(
            &url,
            HttpResponse::new(200, r#"{"messages":[{"id":"a"},{"id":"b"}],"nextPageToken":"n1"}"#),
        );
        let gateway = gateway(transport.clone());

        let page = gateway
            .list_page(&token(), "subject:(x)", 500, Some(&PageToken::new("p0")))
            .await
            .unwrap();

        assert_eq!(page.ids, vec![MessageId::from("a"), MessageId::from("b")]);
        assert_eq!(page.next_page_token, Some(PageToken::new("n1")));

        let sent = &transport.calls()[0];
        assert_eq!(sent.query_value("q"), Some("subject:(x)"));
        assert_eq!(sent.query_value("maxResults"), Some("500"));
        assert_eq!(sent.query_value("pageToken"), Some("p0"));
    }

    #[tokio::test]
    async fn trash_encodes_id_and_posts() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(&format!("{BASE}/messages/a%2Fb/trash"), HttpResponse::new(200, "{}"));

        gateway(transport.clone()).trash(&token(), &MessageId::from("a/b")).await.unwrap();

        let sent = &transport.calls()[0];
        assert_eq!(sent.method, mailsweep_core::HttpMethod::Post);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            &format!("{BASE}/profile"),
            HttpResponse::new(401, r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#),
        );

        let err = gateway(transport).profile(&token()).await.unwrap_err();

        match err {
            SweepError::Auth { message } => assert!(message.contains("Invalid Credentials")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_statuses_map_to_service_errors() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(&format!("{BASE}/messages/gone/trash"), HttpResponse::new(404, "Not Found"));

        let err = gateway(transport).trash(&token(), &MessageId::from("gone")).await.unwrap_err();

        assert_eq!(err, SweepError::service(404, "Not Found"));
    }

    #[tokio::test]
    async fn preview_requests_metadata_headers() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            &format!("{BASE}/messages/m1"),
            HttpResponse::new(
                200,
                r#"{"id":"m1","payload":{"headers":[{"name":"Subject","value":"Sale"}]}}"#,
            ),
        );

        let preview =
            gateway(transport.clone()).fetch_preview(&token(), &MessageId::from("m1")).await.unwrap();

        assert_eq!(preview.subject, "Sale");
        let sent = &transport.calls()[0];
        assert_eq!(sent.query_value("format"), Some("metadata"));
        let headers: Vec<_> = sent
            .query
            .iter()
            .filter(|(k, _)| k == "metadataHeaders")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(headers, METADATA_HEADERS);
    }

    #[tokio::test]
    async fn malformed_body_is_internal() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(&format!("{BASE}/profile"), HttpResponse::new(200, "not json"));

        let err = gateway(transport).profile(&token()).await.unwrap_err();

        assert!(matches!(err, SweepError::Internal { .. }));
    }
}
