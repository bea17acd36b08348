//! Watcher configuration.

use crate::dedup::DedupWindow;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    /// How often the change counter is checked.
    pub poll_interval: Duration,
    pub dedup: DedupWindow,
    /// How often the retention sweep runs while the watcher is running.
    pub sweep_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            dedup: DedupWindow::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl WatcherConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
