//! Batched, concurrency-limited mutation engine
//!
//! Identifiers are split into batches of `batch_size`; each batch is split
//! into groups of `concurrency`. All requests of a group run concurrently and
//! the next group starts only once every member has resolved, so at most
//! `concurrency` requests are ever in flight. Each member's outcome is
//! recorded the moment it resolves, so a slow peer never delays progress.
//! Batches are separated by a short pause to smooth out bursts.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use mailsweep_domain::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_INTER_BATCH_DELAY_MS,
};
use mailsweep_domain::{
    BatchSettings, BearerToken, IdentifierSet, ItemFailure, ItemOutcome, MessageId, Result,
    RunResult, RunState, SweepError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::progress::{ProgressObserver, ProgressTracker};
use crate::ports::MailboxGateway;

/// Pacing parameters, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    batch_size: usize,
    concurrency: usize,
    inter_batch_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
        }
    }
}

impl EngineConfig {
    /// # Errors
    /// Returns `SweepError::Config` when `batch_size` or `concurrency` is 0.
    pub fn new(batch_size: usize, concurrency: usize, inter_batch_delay: Duration) -> Result<Self> {
        if batch_size == 0 {
            return Err(SweepError::config("batch size must be greater than 0"));
        }
        if concurrency == 0 {
            return Err(SweepError::config("concurrency must be greater than 0"));
        }
        Ok(Self { batch_size, concurrency, inter_batch_delay })
    }

    /// Identifiers per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }
}

impl TryFrom<&BatchSettings> for EngineConfig {
    type Error = SweepError;

    fn try_from(settings: &BatchSettings) -> Result<Self> {
        Self::new(
            settings.batch_size,
            settings.concurrency,
            Duration::from_millis(settings.inter_batch_delay_ms),
        )
    }
}

/// Trashes an identifier set against a [`MailboxGateway`] under an
/// [`EngineConfig`].
#[derive(Clone)]
pub struct BatchEngine {
    gateway: Arc<dyn MailboxGateway>,
    config: EngineConfig,
}

impl BatchEngine {
    /// Engine driving `gateway` with the given pacing.
    pub fn new(gateway: Arc<dyn MailboxGateway>, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    /// Pacing this engine runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Trash every id in `ids`, reporting each success to `observer`.
    ///
    /// `observer` sees `(0, total)` before any request, then one snapshot per
    /// success. `cancel` is checked before every batch, every group and
    /// every individual request; requests already in flight are allowed to
    /// finish. Per-item failures never stop the run.
    #[instrument(skip_all, fields(total = ids.len(), batch_size = self.config.batch_size, concurrency = self.config.concurrency))]
    pub async fn execute<O: ProgressObserver>(
        &self,
        token: &BearerToken,
        ids: &IdentifierSet,
        observer: O,
        cancel: &CancellationToken,
    ) -> RunResult {
        let total = ids.len();
        let mut progress = ProgressTracker::new(total, observer);
        progress.start();

        let mut succeeded = 0usize;
        let mut failures: Vec<ItemFailure> = Vec::new();
        let mut cancelled = false;

        let batches: Vec<&[MessageId]> = ids.as_slice().chunks(self.config.batch_size).collect();
        let batch_count = batches.len();

        'batches: for (index, batch) in batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            debug!(batch = index + 1, of = batch_count, size = batch.len(), "starting batch");

            for group in batch.chunks(self.config.concurrency) {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break 'batches;
                }

                let mut pending: FuturesUnordered<_> =
                    group.iter().map(|id| self.trash_one(token, id, cancel)).collect();

                while let Some((id, outcome)) = pending.next().await {
                    match outcome {
                        ItemOutcome::Succeeded => {
                            succeeded += 1;
                            progress.advance();
                        }
                        ItemOutcome::Failed { reason } => {
                            failures.push(ItemFailure { id: id.clone(), reason });
                        }
                        ItemOutcome::Skipped => cancelled = true,
                    }
                }
            }

            let is_last = index + 1 == batch_count;
            if !is_last && !self.config.inter_batch_delay.is_zero() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    () = tokio::time::sleep(self.config.inter_batch_delay) => {}
                }
            }
        }

        let failed = failures.len();
        let skipped = total - succeeded - failed;
        let state = if cancelled { RunState::Cancelled } else { RunState::Completed };

        info!(
            state = %state,
            succeeded,
            failed,
            skipped,
            completed = progress.completed(),
            "batch run finished"
        );

        RunResult { state, total, succeeded, failed, skipped, failures }
    }

    async fn trash_one<'a>(
        &self,
        token: &BearerToken,
        id: &'a MessageId,
        cancel: &CancellationToken,
    ) -> (&'a MessageId, ItemOutcome) {
        if cancel.is_cancelled() {
            return (id, ItemOutcome::Skipped);
        }
        match self.gateway.trash(token, id).await {
            Ok(()) => {
                debug!(id = %id, "trashed");
                (id, ItemOutcome::Succeeded)
            }
            Err(err) => {
                warn!(id = %id, kind = err.label(), error = %err, "failed to trash message");
                (id, ItemOutcome::Failed { reason: err.to_string() })
            }
        }
    }
}
