//! Automated history cleanup.

use chrono::{DateTime, Utc};
use clipkeep_history::{ClipRepository, HistorySettings};

/// Age and size limits applied by a sweep. A zero limit is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention_days: u32,
    pub max_items: usize,
}

/// Records removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub trimmed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.expired + self.trimmed
    }
}

impl From<&HistorySettings> for RetentionPolicy {
    fn from(settings: &HistorySettings) -> Self {
        Self {
            retention_days: settings.retention_days,
            max_items: settings.max_items,
        }
    }
}

impl RetentionPolicy {
    /// Records captured before this instant are expired.
    pub fn threshold(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (self.retention_days > 0).then(|| now - chrono::Duration::days(i64::from(self.retention_days)))
    }

    /// Purge expired records, then trim to the size cap. Pinned records
    /// survive both steps.
    pub fn sweep<R: ClipRepository>(&self, store: &R, now: DateTime<Utc>) -> Result<SweepReport, R::Error> {
        let expired = match self.threshold(now) {
            Some(threshold) => store.purge_older_than(threshold)?,
            None => 0,
        };
        let trimmed = if self.max_items > 0 {
            store.trim_to(self.max_items)?
        } else {
            0
        };

        let report = SweepReport { expired, trimmed };
        if report.total() > 0 {
            tracing::info!(expired, trimmed, "History retention sweep removed records");
        }
        Ok(report)
    }
}
