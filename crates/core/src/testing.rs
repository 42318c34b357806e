//! In-memory port doubles for tests
//!
//! Available to this crate's unit tests and, behind the `test-utils`
//! feature, to downstream crates.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mailsweep_domain::{
    BearerToken, MailboxProfile, MessageId, MessagePage, MessagePreview, PageToken, Result,
    SweepError,
};
use parking_lot::Mutex;

use crate::ports::{CredentialProvider, HttpRequest, HttpResponse, HttpTransport, MailboxGateway};

type Scripted = Result<HttpResponse>;

/// Scripted transport: responses are queued per URL and served FIFO.
#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, url: &str, response: HttpResponse) {
        self.scripts.lock().entry(url.to_string()).or_default().push_back(Ok(response));
    }

    pub fn push_error(&self, url: &str, error: SweepError) {
        self.scripts.lock().entry(url.to_string()).or_default().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.calls.lock().push(request);
        self.scripts.lock().get_mut(&url).and_then(VecDeque::pop_front).unwrap_or_else(|| {
            Err(SweepError::internal(format!("no scripted response for {url}")))
        })
    }
}

/// Credential provider returning a fixed outcome and counting calls.
pub struct MockCredentialProvider {
    outcome: Result<BearerToken>,
    calls: AtomicUsize,
}

impl MockCredentialProvider {
    pub fn token(secret: &str) -> Self {
        Self { outcome: Ok(BearerToken::new(secret, None)), calls: AtomicUsize::new(0) }
    }

    pub fn failing(message: &str) -> Self {
        Self { outcome: Err(SweepError::auth(message)), calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn acquire(&self) -> Result<BearerToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Recorded `list_page` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub query: String,
    pub page_size: u32,
    pub page_token: Option<String>,
}

type TrashHook = Box<dyn Fn(&MessageId) + Send + Sync>;

/// In-memory mailbox.
///
/// Pages are keyed by the incoming page token (`None` for the first page) and
/// are never consumed, so repeated enumerations see the same data. Trash
/// calls track the number of concurrently running calls.
#[derive(Default)]
pub struct MockMailbox {
    pages: HashMap<Option<String>, Result<MessagePage>>,
    trash_failures: HashMap<String, SweepError>,
    preview_failures: HashMap<String, SweepError>,
    trash_latency: Duration,
    trash_latency_for: HashMap<String, Duration>,
    trash_hook: Option<TrashHook>,
    list_calls: Mutex<Vec<ListCall>>,
    trashed: Mutex<Vec<MessageId>>,
    preview_calls: Mutex<Vec<MessageId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `ids` split into pages of `page_len`, chained by tokens
    /// `"p1"`, `"p2"`, ...
    #[must_use]
    pub fn with_ids(mut self, ids: &[&str], page_len: usize) -> Self {
        let chunks: Vec<&[&str]> = ids.chunks(page_len.max(1)).collect();
        if chunks.is_empty() {
            self.pages.insert(None, Ok(MessagePage::default()));
            return self;
        }
        for (index, chunk) in chunks.iter().enumerate() {
            let key = (index > 0).then(|| format!("p{index}"));
            let next = (index + 1 < chunks.len()).then(|| PageToken::new(format!("p{}", index + 1)));
            let page = MessagePage {
                ids: chunk.iter().map(|id| MessageId::from(*id)).collect(),
                next_page_token: next,
            };
            self.pages.insert(key, Ok(page));
        }
        self
    }

    #[must_use]
    pub fn with_page(mut self, token: Option<&str>, page: Result<MessagePage>) -> Self {
        self.pages.insert(token.map(str::to_string), page);
        self
    }

    #[must_use]
    pub fn with_trash_failure(mut self, id: &str, error: SweepError) -> Self {
        self.trash_failures.insert(id.to_string(), error);
        self
    }

    #[must_use]
    pub fn with_preview_failure(mut self, id: &str, error: SweepError) -> Self {
        self.preview_failures.insert(id.to_string(), error);
        self
    }

    /// Each trash call sleeps this long before completing.
    #[must_use]
    pub fn with_trash_latency(mut self, latency: Duration) -> Self {
        self.trash_latency = latency;
        self
    }

    /// Trash calls for `id` sleep `latency` instead of the shared latency.
    #[must_use]
    pub fn with_trash_latency_for(mut self, id: &str, latency: Duration) -> Self {
        self.trash_latency_for.insert(id.to_string(), latency);
        self
    }

    /// Runs before each trash call is counted as in flight.
    #[must_use]
    pub fn with_trash_hook(mut self, hook: impl Fn(&MessageId) + Send + Sync + 'static) -> Self {
        self.trash_hook = Some(Box::new(hook));
        self
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.list_calls.lock().clone()
    }

    /// Ids in the order their trash calls started.
    pub fn trashed(&self) -> Vec<MessageId> {
        self.trashed.lock().clone()
    }

    pub fn preview_calls(&self) -> Vec<MessageId> {
        self.preview_calls.lock().clone()
    }

    /// Highest number of trash calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailboxGateway for MockMailbox {
    async fn list_page(
        &self,
        _token: &BearerToken,
        query: &str,
        page_size: u32,
        page_token: Option<&PageToken>,
    ) -> Result<MessagePage> {
        let key = page_token.map(|t| t.as_str().to_string());
        self.list_calls.lock().push(ListCall {
            query: query.to_string(),
            page_size,
            page_token: key.clone(),
        });
        self.pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(SweepError::service(400, format!("unknown page token {key:?}"))))
    }

    async fn trash(&self, _token: &BearerToken, id: &MessageId) -> Result<()> {
        if let Some(hook) = &self.trash_hook {
            hook(id);
        }
        self.trashed.lock().push(id.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let latency = self.trash_latency_for.get(id.as_str()).copied().unwrap_or(self.trash_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.trash_failures.get(id.as_str()) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn fetch_preview(&self, _token: &BearerToken, id: &MessageId) -> Result<MessagePreview> {
        self.preview_calls.lock().push(id.clone());
        if let Some(error) = self.preview_failures.get(id.as_str()) {
            return Err(error.clone());
        }
        Ok(MessagePreview {
            id: id.clone(),
            from: format!("sender-{id}@example.com"),
            to: "me@example.com".to_string(),
            subject: format!("Subject {id}"),
            date: "Mon, 1 Jan 2024 00:00:00 +0000".to_string(),
        })
    }

    async fn profile(&self, _token: &BearerToken) -> Result<MailboxProfile> {
        Ok(MailboxProfile {
            email_address: "me@example.com".to_string(),
            messages_total: 100,
            threads_total: 80,
            history_id: None,
        })
    }
}

/// `n` ids named `m0`, `m1`, ...
pub fn message_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("m{i}")).collect()
}

