//! Indexing daemon library exports.
//!
//! This crate provides the CLI binary that drives the indexing controller
//! against an on-disk index and event log.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (run, index, delete, status, search)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    build_controller, delete_ids, drive, handle_delete, handle_index, handle_run, handle_search,
    index_file, index_status, init_tracing, load_settings, run_indexer, search_index, show_status,
    DaemonController, DrainOutcome, IndexStatus, Overrides,
};
