//! Remote message store port
//!
//! The adapter is responsible for routing every call through the backoff
//! executor and for mapping terminal HTTP statuses onto `SweepError`:
//! 401 becomes `Auth`, other non-success statuses become `Service`.

use async_trait::async_trait;
use mailsweep_domain::{
    BearerToken, MailboxProfile, MessageId, MessagePage, MessagePreview, PageToken, Result,
};

#[async_trait]
pub trait MailboxGateway: Send + Sync {
    /// Fetch one page of ids matching `query`.
    async fn list_page(
        &self,
        token: &BearerToken,
        query: &str,
        page_size: u32,
        page_token: Option<&PageToken>,
    ) -> Result<MessagePage>;

    /// Move one message to the trash. Success means a 2xx response.
    async fn trash(&self, token: &BearerToken, id: &MessageId) -> Result<()>;

    /// Fetch the sender, recipient, subject and date headers of one message.
    async fn fetch_preview(&self, token: &BearerToken, id: &MessageId) -> Result<MessagePreview>;

    /// Account the token belongs to.
    async fn profile(&self, token: &BearerToken) -> Result<MailboxProfile>;
}
