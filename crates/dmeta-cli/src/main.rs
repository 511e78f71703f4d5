//! dmeta CLI - local cache and fuzzy lookup for script documentation meta.
//!
//! This is the main entry point for the dmeta command-line interface.
//! Command implementations live in separate modules under `commands`.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::SearchOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    execute_command(cli).await
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Reload { url } => commands::reload(url.as_deref()).await,
        Commands::Add { url, plugin } => commands::add_source(&url, plugin.as_deref()).await,
        Commands::Search {
            query,
            kind,
            smart,
            all_fields,
            limit,
            format,
        } => {
            let options = SearchOptions {
                query: query.join(" "),
                kind,
                smart,
                all_fields,
                limit,
                format,
            };
            commands::search(&options).await
        },
        Commands::Sources { format } => commands::list_sources(format).await,
    }
}
