//! mailsweep - bulk trashing of Gmail messages matching a search

mod commands;
mod context;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::FilterArgs;

#[derive(Parser)]
#[command(name = "mailsweep", version, about = "Move every Gmail message matching a search to the trash")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (JSON or TOML); probed in the usual locations when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the search string built from the filter flags
    Query {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Count the messages matching a filter
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show sender, subject and date of matching messages
    Preview {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Messages per page (defaults to the configured preview size)
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Move every matching message to the trash
    Trash {
        #[command(flatten)]
        filter: FilterArgs,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Messages per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Concurrent requests within a batch
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Loaded before logging so RUST_LOG from .env applies.
    let dotenv = dotenvy::dotenv();
    logging::init(&cli.log_level, cli.log_json);
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) => tracing::debug!(error = %err, "no .env loaded"),
    }

    match cli.command {
        Commands::Query { filter } => commands::query::execute(&filter),
        Commands::Count { filter } => commands::count::execute(cli.config, &filter).await,
        Commands::Preview { filter, page, page_size } => {
            commands::preview::execute(cli.config, &filter, page, page_size).await
        }
        Commands::Trash { filter, yes, batch_size, concurrency } => {
            let options = commands::trash::TrashOptions { yes, batch_size, concurrency };
            commands::trash::execute(cli.config, &filter, options).await
        }
    }
}
