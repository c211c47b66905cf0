//! Event full-text indexing daemon
//!
//! Keeps a full-text index in step with a JSON-lines event log.
//!
//! # Usage
//!
//! ```bash
//! fts-daemon run [--events FILE]
//! fts-daemon index --events FILE
//! fts-daemon delete ID...
//! fts-daemon status
//! fts-daemon search QUERY [-n LIMIT]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/event-fts/config.toml)
//! 3. Environment variables (FTS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use fts_daemon::{
    handle_delete, handle_index, handle_run, handle_search, init_tracing, load_settings,
    show_status, Cli, Commands, Overrides,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let event_log_path = match &cli.command {
        Commands::Run { events } => events.clone(),
        _ => None,
    };
    let overrides = Overrides {
        log_level: cli.log_level.clone(),
        index_path: cli.index_path.clone(),
        event_log_path,
    };
    let settings = load_settings(cli.config.as_deref(), &overrides)?;
    init_tracing(&settings.log_level)?;

    match cli.command {
        Commands::Run { .. } => {
            handle_run(&settings).await?;
        }
        Commands::Index { events } => {
            handle_index(&settings, &events).await?;
        }
        Commands::Delete { ids } => {
            handle_delete(&settings, ids).await?;
        }
        Commands::Status => {
            show_status(&settings)?;
        }
        Commands::Search { query, limit } => {
            handle_search(&settings, &query, limit)?;
        }
    }

    Ok(())
}
