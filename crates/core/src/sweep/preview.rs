//! Paged metadata previews of enumerated messages

use std::sync::Arc;

use futures::future::join_all;
use mailsweep_domain::constants::{DEFAULT_CONCURRENCY, DEFAULT_PREVIEW_PAGE_SIZE};
use mailsweep_domain::{BearerToken, IdentifierSet, PreviewPage, Result, SweepError};
use tracing::{debug, instrument};

use crate::ports::MailboxGateway;

/// Fetches sender, recipient, subject and date for a window of ids.
///
/// Fetches within a page run in groups of at most `concurrency`.
#[derive(Clone)]
pub struct PreviewService {
    gateway: Arc<dyn MailboxGateway>,
    concurrency: usize,
}

impl PreviewService {
    /// Service with the default concurrency.
    pub fn new(gateway: Arc<dyn MailboxGateway>) -> Self {
        Self { gateway, concurrency: DEFAULT_CONCURRENCY }
    }

    /// Limit concurrent metadata fetches; clamped to at least 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch metadata for page `page_index` (0-based) of `ids`.
    ///
    /// A page past the end is empty with `has_more == false`.
    ///
    /// # Errors
    /// `InvalidInput` for a zero page size; otherwise the first fetch error.
    #[instrument(skip(self, token, ids), fields(total = ids.len()))]
    pub async fn page(
        &self,
        token: &BearerToken,
        ids: &IdentifierSet,
        page_index: usize,
        page_size: usize,
    ) -> Result<PreviewPage> {
        if page_size == 0 {
            return Err(SweepError::invalid_input("preview page size must be greater than 0"));
        }

        let all = ids.as_slice();
        let start = page_index.saturating_mul(page_size).min(all.len());
        let end = start.saturating_add(page_size).min(all.len());
        let window = &all[start..end];

        let mut items = Vec::with_capacity(window.len());
        for group in window.chunks(self.concurrency) {
            let fetched =
                join_all(group.iter().map(|id| self.gateway.fetch_preview(token, id))).await;
            for preview in fetched {
                items.push(preview?);
            }
        }
        debug!(page = page_index, fetched = items.len(), "preview page loaded");

        Ok(PreviewPage { items, page: page_index, total_matches: all.len(), has_more: end < all.len() })
    }

    /// First page with the default page size.
    ///
    /// # Errors
    /// Same as [`Self::page`].
    pub async fn first_page(&self, token: &BearerToken, ids: &IdentifierSet) -> Result<PreviewPage> {
        self.page(token, ids, 0, DEFAULT_PREVIEW_PAGE_SIZE).await
    }
}
