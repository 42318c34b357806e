//! Subcommand implementations

pub mod count;
pub mod preview;
pub mod query;
pub mod trash;

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Args;
use mailsweep_core::build_query;
use mailsweep_domain::{Config, MailboxProfile, QuerySpec};

/// Filter flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Words that must appear in the subject
    #[arg(long)]
    pub subject: Option<String>,
    /// Sender address, domain or `*@domain`
    #[arg(long)]
    pub from: Option<String>,
    /// Only messages older than this many days
    #[arg(long)]
    pub older_than_days: Option<i64>,
    /// Leave starred messages alone
    #[arg(long)]
    pub exclude_starred: bool,
    /// Leave messages marked important alone
    #[arg(long)]
    pub exclude_important: bool,
    /// Raw search string; replaces every other filter flag
    #[arg(
        long,
        conflicts_with_all = ["subject", "from", "older_than_days", "exclude_starred", "exclude_important"]
    )]
    pub query: Option<String>,
}

impl FilterArgs {
    pub fn spec(&self) -> QuerySpec {
        QuerySpec {
            subject: self.subject.clone(),
            from: self.from.clone(),
            older_than_days: self.older_than_days,
            exclude_starred: self.exclude_starred,
            exclude_important: self.exclude_important,
        }
    }

    /// Search string for this filter; empty filters are refused.
    pub fn resolve(&self) -> anyhow::Result<String> {
        let query = match &self.query {
            Some(raw) => raw.split_whitespace().collect::<Vec<_>>().join(" "),
            None => build_query(&self.spec()),
        };
        if query.is_empty() {
            bail!("no filter given: pass --subject, --from, --older-than-days or --query");
        }
        Ok(query)
    }
}

/// Load configuration from `path` (or the probed file) and the environment.
pub fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    mailsweep_infra::config::load_with(path).context("failed to load configuration")
}

pub fn describe_account(profile: &MailboxProfile) -> String {
    format!("Signed in as {} ({} messages)", profile.email_address, profile.messages_total)
}
