use std::path::PathBuf;

use anyhow::{bail, Context as _};
use mailsweep_domain::{ProgressSnapshot, RunResult, RunState, SweepError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use super::preview::render_page;
use super::{describe_account, load_config, FilterArgs};
use crate::context::{cancel_on_ctrl_c, AppContext};

/// Flags specific to `trash`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrashOptions {
    pub yes: bool,
    pub batch_size: Option<usize>,
    pub concurrency: Option<usize>,
}

pub async fn execute(
    config: Option<PathBuf>,
    filter: &FilterArgs,
    options: TrashOptions,
) -> anyhow::Result<()> {
    let query = filter.resolve()?;
    let mut config = load_config(config)?;
    if let Some(batch_size) = options.batch_size {
        config.batch.batch_size = batch_size;
    }
    if let Some(concurrency) = options.concurrency {
        config.batch.concurrency = concurrency;
    }
    let context = AppContext::new(config)?;
    let cancel = cancel_on_ctrl_c();

    let profile = context.service.profile().await.context("failed to read the mailbox profile")?;
    println!("{}", describe_account(&profile));

    let discovery = match context.service.discover(&query, &cancel).await {
        Ok(discovery) => discovery,
        Err(SweepError::Cancelled) => {
            println!("Cancelled before any message was trashed.");
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to enumerate messages"),
    };

    if discovery.is_empty() {
        println!("No messages match `{}`", discovery.query());
        return Ok(());
    }

    println!("{} messages match `{}`", discovery.len(), discovery.query());
    let page_size = context.config.preview.page_size;
    let sample = context.service.preview(&discovery, 0, page_size).await;
    match sample {
        Ok(page) => print!("{}", render_page(&page, page_size)),
        Err(err) => eprintln!("could not load previews: {err}"),
    }

    if !options.yes && !confirm(discovery.len()).await? {
        context.service.decline()?;
        println!("Nothing was trashed.");
        return Ok(());
    }

    let result = context
        .service
        .execute(discovery, |s: ProgressSnapshot| eprint!("\r{}", render_progress(s)), &cancel)
        .await
        .context("trash run failed")?;
    eprintln!();

    info!(
        state = %result.state,
        succeeded = result.succeeded,
        failed = result.failed,
        skipped = result.skipped,
        "trash run finished"
    );
    print!("{}", render_summary(&result));

    if result.state == RunState::Failed {
        bail!("trash run failed");
    }
    Ok(())
}

/// Ask on stdin; anything but `y`/`yes` declines.
async fn confirm(count: usize) -> anyhow::Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("Move {count} messages to the trash? [y/N] ").as_bytes())
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn render_progress(snapshot: ProgressSnapshot) -> String {
    format!(
        "trashed {}/{} ({:.0}%)",
        snapshot.completed,
        snapshot.total,
        snapshot.fraction() * 100.0
    )
}

/// Counts only; individual failures are in the logs.
pub fn render_summary(result: &RunResult) -> String {
    format!(
        "{}: attempted {}, succeeded {}, failed {}, skipped {}\n",
        result.state,
        result.attempted(),
        result.succeeded,
        result.failed,
        result.skipped
    )
}

#[cfg(test)]
mod tests {
    use mailsweep_domain::{ItemFailure, MessageId};

    use super::*;

    #[test]
    fn confirmation_accepts_only_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
        assert!(!is_yes("yeah"));
    }

    #[test]
    fn progress_line() {
        assert_eq!(render_progress(ProgressSnapshot::new(8, 23)), "trashed 8/23 (35%)");
        assert_eq!(render_progress(ProgressSnapshot::new(0, 0)), "trashed 0/0 (100%)");
    }

    #[test]
    fn summary_reports_counts() {
        let result = RunResult {
            state: RunState::Cancelled,
            total: 10,
            succeeded: 6,
            failed: 1,
            skipped: 3,
            failures: vec![ItemFailure { id: MessageId::from("m4"), reason: "Service error (404): gone".into() }],
        };

        let out = render_summary(&result);

        assert_eq!(out, "cancelled: attempted 7, succeeded 6, failed 1, skipped 3\n");
        assert!(!out.contains("m4"));
    }
}
