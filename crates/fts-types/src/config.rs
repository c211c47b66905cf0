//! Configuration loading for event-fts.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/event-fts/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::FtsError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the full-text index directory
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Path to the JSON-lines event log the index mirrors
    #[serde(default = "default_event_log_path")]
    pub event_log_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Events per index task; bounds the work done per scheduler tick
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Memory budget for the index writer in MB
    #[serde(default = "default_writer_memory_mb")]
    pub writer_memory_mb: usize,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "event-fts")
}

fn default_index_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("fts-index"))
        .unwrap_or_else(|| PathBuf::from("./fts-index"))
        .to_string_lossy()
        .to_string()
}

fn default_event_log_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("events.jsonl"))
        .unwrap_or_else(|| PathBuf::from("./events.jsonl"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chunk_size() -> usize {
    32
}

fn default_writer_memory_mb() -> usize {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            event_log_path: default_event_log_path(),
            log_level: default_log_level(),
            chunk_size: default_chunk_size(),
            writer_memory_mb: default_writer_memory_mb(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/event-fts/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (FTS_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, FtsError> {
        let config_dir = project_dirs()
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("index_path", default_index_path())
            .map_err(|e| FtsError::Config(e.to_string()))?
            .set_default("event_log_path", default_event_log_path())
            .map_err(|e| FtsError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| FtsError::Config(e.to_string()))?
            .set_default("chunk_size", default_chunk_size() as i64)
            .map_err(|e| FtsError::Config(e.to_string()))?
            .set_default("writer_memory_mb", default_writer_memory_mb() as i64)
            .map_err(|e| FtsError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FTS_INDEX_PATH, FTS_CHUNK_SIZE, ... Field names contain underscores,
        // so the prefix separator is distinct from the nesting separator.
        builder = builder.add_source(
            Environment::with_prefix("FTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .map_err(|e| FtsError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FtsError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), FtsError> {
        if self.chunk_size == 0 {
            return Err(FtsError::Config("chunk_size must be > 0".to_string()));
        }
        if self.writer_memory_mb == 0 {
            return Err(FtsError::Config("writer_memory_mb must be > 0".to_string()));
        }
        Ok(())
    }

    /// Index path with a leading `~/` expanded to the home directory
    pub fn expanded_index_path(&self) -> PathBuf {
        expand_home(&self.index_path)
    }

    /// Event log path with a leading `~/` expanded to the home directory
    pub fn expanded_event_log_path(&self) -> PathBuf {
        expand_home(&self.event_log_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(base) = directories::BaseDirs::new() {
            return base.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
