//! Sweep orchestration - core business logic
//!
//! Drives one run through `Idle → Enumerating → Executing → terminal`,
//! acquiring the credential once and sharing it with every request of the
//! run.

use std::sync::Arc;

use mailsweep_domain::{
    BearerToken, IdentifierSet, MailboxProfile, PreviewPage, ProgressSnapshot, Result, RunResult,
    RunState, SweepError,
};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use super::engine::{BatchEngine, EngineConfig};
use super::enumerator::Enumerator;
use super::preview::PreviewService;
use super::progress::ProgressObserver;
use crate::ports::{CredentialProvider, MailboxGateway};

/// Enumeration output awaiting execution.
#[derive(Debug, Clone)]
pub struct Discovery {
    query: String,
    token: BearerToken,
    ids: IdentifierSet,
}

impl Discovery {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn ids(&self) -> &IdentifierSet {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Bulk-trash service
pub struct SweepService {
    credentials: Arc<dyn CredentialProvider>,
    gateway: Arc<dyn MailboxGateway>,
    enumerator: Enumerator,
    engine: BatchEngine,
    preview: PreviewService,
    state: Mutex<RunState>,
}

impl SweepService {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        gateway: Arc<dyn MailboxGateway>,
        config: EngineConfig,
    ) -> Self {
        Self {
            enumerator: Enumerator::new(gateway.clone()),
            engine: BatchEngine::new(gateway.clone(), config),
            preview: PreviewService::new(gateway.clone()).with_concurrency(config.concurrency()),
            credentials,
            gateway,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// # Errors
    /// Returns `SweepError::Config` unless `1 <= page_size <= 500`.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self> {
        self.enumerator = self.enumerator.with_page_size(page_size)?;
        Ok(self)
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    /// Account the configured credential belongs to.
    ///
    /// # Errors
    /// `Auth` if no credential can be obtained, otherwise the gateway's error.
    pub async fn profile(&self) -> Result<MailboxProfile> {
        let token = self.credentials.acquire().await?;
        self.gateway.profile(&token).await
    }

    /// Acquire the credential and enumerate every id matching `filter`.
    ///
    /// A run with zero matches ends here in `Completed`. Otherwise the
    /// service stays in `Enumerating` until [`Self::execute`], [`Self::close`]
    /// or [`Self::decline`].
    ///
    /// # Errors
    /// `Cancelled` if `cancel` fires between pages (state `Cancelled`);
    /// `Auth`, `Transport`, `Service` or `InvalidInput` otherwise (state
    /// `Failed`).
    #[instrument(skip(self, cancel))]
    pub async fn discover(&self, filter: &str, cancel: &CancellationToken) -> Result<Discovery> {
        self.begin()?;

        let outcome = async {
            let token = self.credentials.acquire().await?;
            let ids = self.enumerator.enumerate_until_cancelled(filter, &token, cancel).await?;
            Ok::<_, SweepError>((token, ids))
        }
        .await;

        match outcome {
            Ok((token, ids)) => {
                info!(matches = ids.len(), "enumeration finished");
                if ids.is_empty() {
                    self.transition(RunState::Completed)?;
                }
                Ok(Discovery { query: filter.trim().to_string(), token, ids })
            }
            Err(SweepError::Cancelled) => {
                self.transition(RunState::Cancelled)?;
                Err(SweepError::Cancelled)
            }
            Err(err) => {
                error!(kind = err.label(), error = %err, "enumeration failed");
                self.transition(RunState::Failed)?;
                Err(err)
            }
        }
    }

    /// Metadata for one page of a discovery. Does not change the run state.
    ///
    /// # Errors
    /// See [`PreviewService::page`].
    pub async fn preview(
        &self,
        discovery: &Discovery,
        page_index: usize,
        page_size: usize,
    ) -> Result<PreviewPage> {
        self.preview.page(&discovery.token, &discovery.ids, page_index, page_size).await
    }

    /// Trash everything in `discovery`.
    ///
    /// # Errors
    /// `Internal` if the service is not in `Enumerating`; per-item failures
    /// are reported inside the `RunResult`.
    #[instrument(skip_all, fields(total = discovery.len()))]
    pub async fn execute<O: ProgressObserver>(
        &self,
        discovery: Discovery,
        observer: O,
        cancel: &CancellationToken,
    ) -> Result<RunResult> {
        if discovery.is_empty() {
            return Ok(self.engine.execute(&discovery.token, &discovery.ids, observer, cancel).await);
        }

        self.transition(RunState::Executing)?;
        let result = self.engine.execute(&discovery.token, &discovery.ids, observer, cancel).await;
        self.transition(result.state)?;
        Ok(result)
    }

    /// Enumerate and execute in one go.
    ///
    /// Cancellation during enumeration yields an empty `Cancelled` result.
    ///
    /// # Errors
    /// Fatal enumeration errors, see [`Self::discover`].
    pub async fn run<O: ProgressObserver>(
        &self,
        filter: &str,
        mut observer: O,
        cancel: &CancellationToken,
    ) -> Result<RunResult> {
        match self.discover(filter, cancel).await {
            Ok(discovery) => self.execute(discovery, observer, cancel).await,
            Err(SweepError::Cancelled) => {
                observer.on_progress(ProgressSnapshot::new(0, 0));
                Ok(RunResult::empty(RunState::Cancelled))
            }
            Err(err) => Err(err),
        }
    }

    /// End a discovery that will not be executed (read-only commands).
    ///
    /// # Errors
    /// `Internal` if there is no pending discovery.
    pub fn close(&self) -> Result<()> {
        self.settle(RunState::Completed)
    }

    /// End a discovery the user chose not to execute.
    ///
    /// # Errors
    /// `Internal` if there is no pending discovery.
    pub fn decline(&self) -> Result<()> {
        self.settle(RunState::Cancelled)
    }

    fn settle(&self, next: RunState) -> Result<()> {
        if self.state().is_terminal() {
            return Ok(());
        }
        self.transition(next)
    }

    fn begin(&self) -> Result<()> {
        let mut state = self.state.lock();
        if !(*state == RunState::Idle || state.is_terminal()) {
            return Err(SweepError::invalid_input(format!(
                "a run is already in progress (state: {})",
                *state
            )));
        }
        info!(from = %*state, to = %RunState::Enumerating, "run state changed");
        *state = RunState::Enumerating;
        Ok(())
    }

    fn transition(&self, next: RunState) -> Result<()> {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            return Err(SweepError::internal(format!(
                "illegal run state transition {} -> {next}",
                *state
            )));
        }
        info!(from = %*state, to = %next, "run state changed");
        *state = next;
        Ok(())
    }
}
