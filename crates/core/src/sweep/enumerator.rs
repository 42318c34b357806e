//! Paginated enumeration of every message matching a filter

use std::sync::Arc;

use mailsweep_domain::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use mailsweep_domain::{BearerToken, IdentifierSet, MessageId, Result, SweepError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::ports::MailboxGateway;

/// Walks the result pages of a search one at a time.
///
/// Pages are requested strictly sequentially; ids are accumulated in the
/// order the service returned them, duplicates included.
#[derive(Clone)]
pub struct Enumerator {
    gateway: Arc<dyn MailboxGateway>,
    page_size: u32,
}

impl Enumerator {
    pub fn new(gateway: Arc<dyn MailboxGateway>) -> Self {
        Self { gateway, page_size: DEFAULT_PAGE_SIZE }
    }

    /// # Errors
    /// Returns `SweepError::Config` unless `1 <= page_size <= 500`.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(SweepError::config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Collect every id matching `filter`.
    ///
    /// # Errors
    /// - `InvalidInput` if `filter` is blank
    /// - `Auth`, `Transport` or `Service` from the first failing page
    pub async fn enumerate(&self, filter: &str, token: &BearerToken) -> Result<IdentifierSet> {
        self.enumerate_until_cancelled(filter, token, &CancellationToken::new()).await
    }

    /// Like [`Self::enumerate`], checking `cancel` before each page request.
    ///
    /// # Errors
    /// Additionally returns `SweepError::Cancelled` once `cancel` fires.
    #[instrument(skip(self, token, cancel), fields(page_size = self.page_size))]
    pub async fn enumerate_until_cancelled(
        &self,
        filter: &str,
        token: &BearerToken,
        cancel: &CancellationToken,
    ) -> Result<IdentifierSet> {
        let filter = filter.trim();
        if filter.is_empty() {
            return Err(SweepError::invalid_input("search filter must not be empty"));
        }

        let mut ids: Vec<MessageId> = Vec::new();
        let mut page_token = None;
        let mut pages = 0usize;

        loop {
            if cancel.is_cancelled() {
                info!(pages, collected = ids.len(), "enumeration cancelled");
                return Err(SweepError::Cancelled);
            }

            let page =
                self.gateway.list_page(token, filter, self.page_size, page_token.as_ref()).await?;
            pages += 1;
            debug!(
                page = pages,
                count = page.ids.len(),
                has_next = page.next_page_token.is_some(),
                "received page"
            );
            ids.extend(page.ids);

            // An empty continuation token ends the walk like an absent one.
            match page.next_page_token {
                Some(next) if !next.as_str().is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        info!(pages, total = ids.len(), "enumeration complete");
        Ok(IdentifierSet::new(ids))
    }
}
