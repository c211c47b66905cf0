//! # fts-types
//!
//! Shared domain types for the event full-text indexer.
//!
//! This crate defines the data structures exchanged between the event store,
//! the indexing controller and the search index:
//! - Events: Immutable activity records with one or more subjects
//! - Queries: The vocabulary used to ask an event store for events
//! - Settings: Configuration types
//!
//! ## Usage
//!
//! ```rust
//! use fts_types::{Event, FindEventsQuery};
//!
//! let query = FindEventsQuery::all_events();
//! assert_eq!(query.limit, 0);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod query;

pub use config::Settings;
pub use error::FtsError;
pub use event::{Event, EventId, Subject};
pub use query::{EventTemplate, FindEventsQuery, ResultType, StorageState, TimeRange};
