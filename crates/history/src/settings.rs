//! User-tunable history limits.

use serde::{Deserialize, Serialize};

/// Retention limits for automated cleanup. Pinned records are exempt from both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Non-pinned records older than this many days are purged.
    pub retention_days: u32,
    /// Upper bound on stored non-pinned records; oldest go first.
    pub max_items: usize,
    /// Whether the watcher runs the retention sweep on its own.
    pub auto_cleanup: bool,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            retention_days: 30,
            max_items: 1000,
            auto_cleanup: true,
        }
    }
}

impl HistorySettings {
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }
}
