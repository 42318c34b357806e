//! Application context - wires configuration into the sweep service

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use mailsweep_core::{EngineConfig, RetryNotice, RetryObserver, SweepService};
use mailsweep_domain::Config;
use mailsweep_infra::{credential_provider, gateway_from_config};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Everything a command needs to talk to the mailbox.
pub struct AppContext {
    pub config: Config,
    pub service: SweepService,
}

impl AppContext {
    /// Build the credential provider, gateway and service for `config`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        let credentials = credential_provider(
            &config.auth,
            Duration::from_secs(config.api.timeout_secs),
        )
        .context("failed to set up credentials")?;
        let gateway = gateway_from_config(&config, Some(retry_reporter()))
            .context("failed to set up the mail API client")?;
        let engine = EngineConfig::try_from(&config.batch).context("invalid batch settings")?;

        let service = SweepService::new(credentials, gateway, engine)
            .with_page_size(config.api.page_size)
            .context("invalid page size")?;

        info!(base_url = %config.api.base_url, "application context ready");
        Ok(Self { config, service })
    }
}

/// Retry observer that tells the user why the run is pausing.
fn retry_reporter() -> RetryObserver {
    Arc::new(|attempt: u32, notice: &RetryNotice| {
        eprintln!("retrying request (attempt {attempt}): {notice}");
    })
}

/// Token that is cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("\ncancelling: waiting for in-flight requests to finish");
                trigger.cancel();
            }
            Err(err) => warn!(error = %err, "could not listen for Ctrl-C"),
        }
    });
    token
}
