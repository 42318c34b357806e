use std::path::PathBuf;

use anyhow::Context as _;
use mailsweep_domain::SweepError;

use super::{load_config, FilterArgs};
use crate::context::{cancel_on_ctrl_c, AppContext};

pub async fn execute(config: Option<PathBuf>, filter: &FilterArgs) -> anyhow::Result<()> {
    let query = filter.resolve()?;
    let context = AppContext::new(load_config(config)?)?;
    let cancel = cancel_on_ctrl_c();

    match context.service.discover(&query, &cancel).await {
        Ok(discovery) => {
            context.service.close()?;
            println!("{} messages match `{}`", discovery.len(), discovery.query());
            Ok(())
        }
        Err(SweepError::Cancelled) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(err) => Err(err).context("failed to enumerate messages"),
    }
}
