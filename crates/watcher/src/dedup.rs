//! Suppression of repeat captures.

use chrono::{DateTime, Utc};
use clipkeep_history::{ClipRecord, NewClip};
use std::time::Duration;

pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(10);
pub const DEFAULT_DEDUP_LOOKBACK: usize = 10;

/// Trailing window and record count examined for repeats.
///
/// Apps often re-emit the clipboard several times for one copy. A candidate
/// is a duplicate when one of the newest `lookback` records has the same
/// content and type and was captured less than `window` ago. The source app
/// is deliberately not compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupWindow {
    pub window: Duration,
    pub lookback: usize,
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self {
            window: DEFAULT_DEDUP_WINDOW,
            lookback: DEFAULT_DEDUP_LOOKBACK,
        }
    }
}

impl DedupWindow {
    /// `recent` must be newest first.
    pub fn is_duplicate(&self, candidate: &NewClip, recent: &[ClipRecord], now: DateTime<Utc>) -> bool {
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);
        let window = chrono::Duration::milliseconds(window_ms);

        recent.iter().take(self.lookback).any(|record| {
            now.signed_duration_since(record.captured_at) < window
                && record.content_type == candidate.content_type
                && record.content == candidate.content
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clipkeep_history::ContentType;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn stored(id: i64, content: &str, ty: ContentType, at: DateTime<Utc>) -> ClipRecord {
        ClipRecord::from_new(id, NewClip::new(content, ty, at))
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    #[test]
    fn test_same_content_within_window_is_duplicate() {
        let dedup = DedupWindow::default();
        let recent = [stored(1, "hello", ContentType::Text, t0())];
        let candidate = NewClip::new("hello", ContentType::Text, t0() + secs(2));

        assert!(dedup.is_duplicate(&candidate, &recent, t0() + secs(2)));
    }

    #[test]
    fn test_window_boundary_is_not_duplicate() {
        let dedup = DedupWindow::default();
        let recent = [stored(1, "hello", ContentType::Text, t0())];
        let candidate = NewClip::new("hello", ContentType::Text, t0() + secs(10));

        assert!(!dedup.is_duplicate(&candidate, &recent, t0() + secs(10)));
        assert!(!dedup.is_duplicate(&candidate, &recent, t0() + secs(11)));
    }

    #[test]
    fn test_type_must_match() {
        let dedup = DedupWindow::default();
        let recent = [stored(1, "notes.md", ContentType::FilePath, t0())];
        let candidate = NewClip::new("notes.md", ContentType::Text, t0());

        assert!(!dedup.is_duplicate(&candidate, &recent, t0()));
    }

    #[test]
    fn test_source_app_is_ignored() {
        let dedup = DedupWindow::default();
        let mut record = stored(1, "hello", ContentType::Text, t0());
        record.source_app = Some("com.apple.Safari".into());
        let candidate =
            NewClip::new("hello", ContentType::Text, t0()).with_source_app("com.apple.TextEdit");

        assert!(dedup.is_duplicate(&candidate, &[record], t0() + secs(1)));
    }

    #[test]
    fn test_lookback_limits_records_examined() {
        let dedup = DedupWindow {
            window: Duration::from_secs(60),
            lookback: 2,
        };
        let recent = [
            stored(3, "c", ContentType::Text, t0()),
            stored(2, "b", ContentType::Text, t0()),
            stored(1, "a", ContentType::Text, t0()),
        ];
        let candidate = NewClip::new("a", ContentType::Text, t0());

        assert!(!dedup.is_duplicate(&candidate, &recent, t0()));
    }

    #[test]
    fn test_empty_history() {
        let candidate = NewClip::new("hello", ContentType::Text, t0());
        assert!(!DedupWindow::default().is_duplicate(&candidate, &[], t0()));
    }
}
