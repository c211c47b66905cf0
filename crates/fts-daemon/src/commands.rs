//! Command implementations for the indexing daemon.
//!
//! Handles:
//! - run: check the index, rebuild if stale, apply queued work
//! - index / delete: queue incremental changes and apply them
//! - status / search: read the committed index

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::task::LocalSet;
use tracing::{info, warn};

use fts_indexing::{
    Controller, ControllerConfig, ControllerStats, EventReader, IndexEngine, JsonlEventReader,
    LocalScheduler, RunOutcome, TantivyIndexEngine,
};
use fts_search::{SearchHit, SearchIndexConfig};
use fts_types::{EventId, Settings};

/// Controller over the on-disk index and event log.
pub type DaemonController = Controller<TantivyIndexEngine, JsonlEventReader>;

/// CLI overrides, applied after every other config source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub index_path: Option<String>,
    pub event_log_path: Option<String>,
}

/// Load configuration (defaults -> file -> env) and apply CLI overrides.
pub fn load_settings(config_path: Option<&str>, overrides: &Overrides) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(log_level) = &overrides.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(index_path) = &overrides.index_path {
        settings.index_path = index_path.clone();
    }
    if let Some(event_log_path) = &overrides.event_log_path {
        settings.event_log_path = event_log_path.clone();
    }

    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn open_engine(settings: &Settings) -> Result<TantivyIndexEngine> {
    let config = SearchIndexConfig::new(settings.expanded_index_path())
        .with_memory_mb(settings.writer_memory_mb);
    let mut engine = TantivyIndexEngine::new(config);
    engine
        .initialize()
        .context("Failed to initialize index")?;
    Ok(engine)
}

/// Build a controller that applies its work on the current `LocalSet`.
pub fn build_controller(settings: &Settings) -> Result<DaemonController> {
    let engine = TantivyIndexEngine::new(
        SearchIndexConfig::new(settings.expanded_index_path())
            .with_memory_mb(settings.writer_memory_mb),
    );
    let reader = JsonlEventReader::new(settings.expanded_event_log_path());
    let config = ControllerConfig::default().with_chunk_size(settings.chunk_size);

    let controller = Controller::new(engine, reader, Rc::new(LocalScheduler::new()), config);
    controller
        .initialize()
        .context("Failed to initialize index")?;
    Ok(controller)
}

/// How often `drive` checks whether the controller went idle.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a drive of the controller ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every queued task was applied and the commit was attempted
    Drained(ControllerStats),
    /// Interrupted with tasks still queued; their work is lost
    Interrupted { pending: usize },
}

/// Wait until the controller goes idle or Ctrl+C arrives.
///
/// Ticks run as local tasks between polls; this future only sleeps.
///
/// Must be polled inside the `LocalSet` the controller's ticks run on.
pub async fn drive<E, R>(controller: &Controller<E, R>) -> Result<DrainOutcome>
where
    E: IndexEngine + 'static,
    R: EventReader + 'static,
{
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while controller.is_armed() {
        tokio::select! {
            res = &mut ctrl_c => {
                res.context("Failed to listen for Ctrl+C")?;
                let pending = controller.pending_tasks();
                if controller.has_pending_tasks() {
                    warn!(
                        pending,
                        "Interrupted with uncommitted index work; an incomplete rebuild restarts on next run"
                    );
                } else {
                    info!("Received Ctrl+C, shutting down...");
                }
                return Ok(DrainOutcome::Interrupted { pending });
            }
            _ = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
        }
    }

    Ok(DrainOutcome::Drained(controller.stats().clone()))
}

/// Check the index, rebuild if stale, and apply everything queued.
pub async fn run_indexer(settings: &Settings) -> Result<DrainOutcome> {
    let local = LocalSet::new();
    local
        .run_until(async {
            let controller = build_controller(settings)?;
            match controller.run() {
                RunOutcome::IndexValid => info!("Index is up to date"),
                RunOutcome::RebuildQueued { events, chunks } => {
                    info!(events, chunks, "Rebuilding index")
                }
                RunOutcome::RebuildAborted => {
                    warn!("Index rebuild could not start; it will be retried on next run")
                }
            }
            drive(&controller).await
        })
        .await
}

/// Index every event in a JSON-lines file.
pub async fn index_file(settings: &Settings, events_path: &str) -> Result<DrainOutcome> {
    let events = JsonlEventReader::new(events_path)
        .read_all()
        .with_context(|| format!("Failed to read events from {}", events_path))?;

    let local = LocalSet::new();
    local
        .run_until(async {
            let controller = build_controller(settings)?;
            let chunks = controller.index_events(events);
            info!(chunks, "Queued events for indexing");
            drive(&controller).await
        })
        .await
}

/// Remove events from the index.
pub async fn delete_ids(settings: &Settings, ids: Vec<EventId>) -> Result<DrainOutcome> {
    let local = LocalSet::new();
    local
        .run_until(async {
            let controller = build_controller(settings)?;
            controller.delete_events(ids);
            drive(&controller).await
        })
        .await
}

/// Snapshot of the committed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub valid: bool,
    pub version: Option<String>,
    pub num_docs: u64,
}

pub fn index_status(settings: &Settings) -> Result<IndexStatus> {
    let engine = open_engine(settings)?;
    Ok(IndexStatus {
        valid: engine.check_index(),
        version: engine
            .stored_version()
            .context("Failed to read index metadata")?,
        num_docs: engine.searcher().context("Failed to open searcher")?.num_docs(),
    })
}

pub fn search_index(settings: &Settings, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let engine = open_engine(settings)?;
    let searcher = engine.searcher().context("Failed to open searcher")?;
    searcher
        .search(query, limit)
        .with_context(|| format!("Search failed for {:?}", query))
}

fn report(outcome: &DrainOutcome) {
    match outcome {
        DrainOutcome::Drained(stats) => {
            println!(
                "Applied {} tasks ({} failed): {} events indexed, {} deleted",
                stats.tasks_processed(),
                stats.tasks_failed,
                stats.events_indexed,
                stats.events_deleted
            );
            if stats.has_errors() {
                println!(
                    "WARNING: {} tasks failed, {} commits failed, {} rebuilds aborted",
                    stats.tasks_failed, stats.failed_commits, stats.rebuilds_aborted
                );
            }
        }
        DrainOutcome::Interrupted { pending } => {
            println!("Interrupted with {} tasks not applied", pending);
        }
    }
}

pub async fn handle_run(settings: &Settings) -> Result<()> {
    info!(
        index = %settings.index_path,
        events = %settings.event_log_path,
        chunk_size = settings.chunk_size,
        "Indexer starting"
    );
    report(&run_indexer(settings).await?);
    Ok(())
}

pub async fn handle_index(settings: &Settings, events_path: &str) -> Result<()> {
    report(&index_file(settings, events_path).await?);
    Ok(())
}

pub async fn handle_delete(settings: &Settings, ids: Vec<EventId>) -> Result<()> {
    report(&delete_ids(settings, ids).await?);
    Ok(())
}

pub fn show_status(settings: &Settings) -> Result<()> {
    let status = index_status(settings)?;
    println!("Index path: {}", settings.expanded_index_path().display());
    println!("Valid: {}", if status.valid { "yes" } else { "no" });
    println!(
        "Version: {}",
        status.version.as_deref().unwrap_or("(none)")
    );
    println!("Documents: {}", status.num_docs);
    Ok(())
}

pub fn handle_search(settings: &Settings, query: &str, limit: usize) -> Result<()> {
    let hits = search_index(settings, query, limit)?;
    if hits.is_empty() {
        println!("No results");
        return Ok(());
    }
    for hit in hits {
        println!("{}\t{:.3}", hit.event_id, hit.score);
    }
    Ok(())
}
