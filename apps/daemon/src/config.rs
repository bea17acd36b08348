//! Environment overrides for the daemon.

use clipkeep_watcher::WatcherConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB: &str = "CLIPKEEP_DB";
pub const ENV_POLL_MS: &str = "CLIPKEEP_POLL_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub database_path: PathBuf,
    pub watcher: WatcherConfig,
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values fall back
    /// to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = lookup(ENV_DB)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(clipkeep_storage::default_database_path);

        let mut watcher = WatcherConfig::default();
        if let Some(raw) = lookup(ENV_POLL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => watcher.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_POLL_MS),
            }
        }

        Self {
            database_path,
            watcher,
        }
    }
}
