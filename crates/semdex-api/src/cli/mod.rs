//! CLI command definitions for the `semdex` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod embedding;
pub mod index;
pub mod search;
pub mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use semdex_observe::tracing_setup::TracingOptions;

/// Semantic similarity index for short texts.
#[derive(Parser)]
#[command(name = "semdex", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Emit log lines on stderr as JSON objects.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Data directory (database, config.toml, model cache).
    #[arg(long, global = true, env = "SEMDEX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup implied by the global flags.
    pub fn tracing_options(&self) -> TracingOptions {
        let filter = match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,semdex=debug",
            _ => "trace",
        };

        TracingOptions {
            default_filter: filter.to_string(),
            json: self.log_json,
            enable_otel: self.otel,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a text and store it under (item_type, item_id).
    Store {
        /// Category tag, e.g. "summary" or "task".
        item_type: String,

        /// Identifier, unique within the item type.
        item_id: String,

        /// Text to embed.
        text: String,
    },

    /// Find the stored items most similar to a text or to a stored item.
    Search {
        /// Query text.
        #[arg(long, short = 't')]
        text: Option<String>,

        /// Item type of a stored item to use as the query.
        #[arg(long)]
        item_type: Option<String>,

        /// Item id of a stored item to use as the query.
        #[arg(long)]
        item_id: Option<String>,

        /// Number of results (defaults to `search.default_top_k`).
        #[arg(long, short = 'k', allow_negative_numbers = true)]
        top_k: Option<i64>,

        /// Keep the referenced item in its own results.
        #[arg(long)]
        include_self: bool,
    },

    /// Show a stored embedding record.
    Show {
        item_type: String,
        item_id: String,
    },

    /// Record counts in total and per item type.
    Stats,

    /// Bulk-index items from a JSON file of `[{"id": ..., "text": ...}]`.
    Index {
        /// Item type assigned to every item in the file.
        item_type: String,

        /// Path to the JSON array of items.
        #[arg(long, short = 'f')]
        file: PathBuf,

        /// Re-embed items that are already stored.
        #[arg(long)]
        force: bool,

        /// Delete every record of the item type first.
        #[arg(long)]
        clear: bool,
    },

    /// Delete stored embeddings (all, by type, and/or by id glob pattern).
    #[command(alias = "rm")]
    Purge {
        /// Only records of this item type.
        #[arg(long)]
        item_type: Option<String>,

        /// Only records whose id matches this glob (`*`, `?`).
        #[arg(long)]
        id_pattern: Option<String>,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
