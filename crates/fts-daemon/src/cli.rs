//! CLI argument parsing for the indexing daemon.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

use fts_types::EventId;

/// Event full-text indexing daemon
///
/// Keeps a full-text index in step with a JSON-lines event log.
#[derive(Parser, Debug)]
#[command(name = "fts-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/event-fts/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override index directory
    #[arg(long, global = true)]
    pub index_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the index, rebuild it from the event log if stale, and apply
    /// all queued work
    Run {
        /// Override event log path
        #[arg(short, long)]
        events: Option<String>,
    },

    /// Incrementally index every event in a JSON-lines file
    Index {
        /// File of events to index
        #[arg(short, long)]
        events: String,
    },

    /// Remove events from the index
    Delete {
        /// Event ids to remove
        #[arg(required = true)]
        ids: Vec<EventId>,
    },

    /// Show index status
    Status,

    /// Search the index
    Search {
        /// Query string
        query: String,

        /// Maximum results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}
