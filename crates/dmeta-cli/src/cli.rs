//! CLI structure and argument parsing for `dmeta`.
//!
//! The CLI follows a standard command-subcommand pattern:
//!
//! ```bash
//! # Rebuild the corpus from the default upstream archive
//! dmeta reload
//!
//! # Pull a fork instead
//! dmeta reload https://github.com/example/fork/archive/dev.zip
//!
//! # Append an addon source, stamping its records
//! dmeta add https://github.com/example/addon/archive/dev.zip --plugin Addon
//!
//! # Look things up
//! dmeta search flag --type command
//! dmeta search "blocks flagged" --smart
//! dmeta search expiring --all-fields --format json
//! ```

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Top-level CLI for the `dmeta` command.
#[derive(Parser, Debug)]
#[command(name = "dmeta")]
#[command(version)]
#[command(about = "dmeta - local cache and fuzzy lookup for script meta", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the entire corpus from one source archive
    Reload {
        /// Archive URL; defaults to the configured upstream source
        #[arg(value_name = "URL")]
        url: Option<String>,
    },

    /// Parse an additional archive and append its records
    Add {
        /// Archive URL
        #[arg(value_name = "URL")]
        url: String,

        /// Plugin label merged into every new record's plugin field
        #[arg(long, value_name = "NAME")]
        plugin: Option<String>,
    },

    /// Search the corpus by record name
    Search {
        /// Search query; multiple words are joined with spaces
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,

        /// Restrict to one record kind ("command", "tag", "mechanism", ...)
        #[arg(long = "type", value_name = "KIND")]
        kind: Option<String>,

        /// Use the ranked fuzzy matcher instead of substring lookup
        #[arg(long)]
        smart: bool,

        /// Match the query against every field, not just names
        #[arg(long, conflicts_with = "smart")]
        all_fields: bool,

        /// Maximum number of results to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List ingested sources and their record counts
    Sources {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
