//! Environment-driven configuration.

use std::path::PathBuf;

use anyhow::Context;
use safecampus_auth::{RouteTable, builtin_routes};
use safecampus_observability::LogFormat;
use safecampus_session::FileStorage;

pub const STORAGE_VAR: &str = "SAFECAMPUS_STORAGE";
pub const ROUTES_VAR: &str = "SAFECAMPUS_ROUTES";
pub const LOG_FORMAT_VAR: &str = "SAFECAMPUS_LOG_FORMAT";

/// Shell configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellConfig {
    /// Storage file; the OS data directory is used when unset.
    pub storage_path: Option<PathBuf>,
    /// JSON route table replacing the built-in one.
    pub routes_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Logging is not up yet, so an unknown format falls back quietly.
        let log_format = non_empty(LOG_FORMAT_VAR)
            .and_then(|raw| LogFormat::parse(&raw))
            .unwrap_or_default();

        Self {
            storage_path: non_empty(STORAGE_VAR).map(PathBuf::from),
            routes_path: non_empty(ROUTES_VAR).map(PathBuf::from),
            log_format,
        }
    }

    pub fn open_storage(&self) -> anyhow::Result<FileStorage> {
        match &self.storage_path {
            Some(path) => Ok(FileStorage::new(path)),
            None => {
                let storage = FileStorage::open_default()
                    .context("failed to resolve default storage location; set SAFECAMPUS_STORAGE")?;
                tracing::debug!(path = ?storage.path(), "{STORAGE_VAR} not set; using default storage");
                Ok(storage)
            }
        }
    }

    pub fn route_table(&self) -> anyhow::Result<RouteTable> {
        let Some(path) = &self.routes_path else {
            return builtin_routes().context("built-in route table is invalid");
        };

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read route table at {path:?}"))?;
        let table = RouteTable::from_json(&json)
            .with_context(|| format!("invalid route table at {path:?}"))?;

        tracing::info!(path = ?path, routes = table.routes().len(), "loaded custom route table");
        Ok(table)
    }
}
