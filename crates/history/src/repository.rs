//! Persistence contracts.
//!
//! Implemented by the storage layer so capture logic stays decoupled from
//! the database. All methods take `&self`; implementations serialize
//! mutations internally and are safe to share across threads.

use crate::exclusion::ExclusionEntry;
use crate::record::{ClipFilter, ClipId, ClipRecord, NewClip};
use crate::settings::HistorySettings;
use chrono::{DateTime, Utc};

/// Durable clipboard history.
pub trait ClipRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a capture and assign the next id.
    fn append(&self, clip: NewClip) -> Result<ClipRecord, Self::Error>;

    fn get(&self, id: ClipId) -> Result<ClipRecord, Self::Error>;

    /// Pinned first, then newest first.
    fn list(&self, filter: &ClipFilter, limit: usize) -> Result<Vec<ClipRecord>, Self::Error>;

    /// Newest first by capture time, ignoring pin state.
    fn recent(&self, limit: usize) -> Result<Vec<ClipRecord>, Self::Error>;

    /// Idempotent: setting the current value again succeeds.
    fn set_pinned(&self, id: ClipId, pinned: bool) -> Result<(), Self::Error>;

    fn delete(&self, id: ClipId) -> Result<(), Self::Error>;

    /// Remove every record, pinned included. Returns the number removed.
    fn delete_all(&self) -> Result<usize, Self::Error>;

    /// Remove non-pinned records captured before `threshold`.
    fn purge_older_than(&self, threshold: DateTime<Utc>) -> Result<usize, Self::Error>;

    /// Remove the oldest non-pinned records until at most `max_items` non-pinned remain.
    fn trim_to(&self, max_items: usize) -> Result<usize, Self::Error>;

    fn count(&self) -> Result<usize, Self::Error>;
}

/// The set of applications excluded from capture.
pub trait ExclusionRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Idempotent. Returns `true` when a new entry was created.
    fn add_exclusion(
        &self,
        app_identifier: &str,
        display_name: Option<&str>,
    ) -> Result<bool, Self::Error>;

    /// Returns `true` when an entry was removed.
    fn remove_exclusion(&self, app_identifier: &str) -> Result<bool, Self::Error>;

    /// Newest first.
    fn list_exclusions(&self) -> Result<Vec<ExclusionEntry>, Self::Error>;

    fn is_excluded(&self, app_identifier: &str) -> Result<bool, Self::Error>;

    fn clear_exclusions(&self) -> Result<usize, Self::Error>;
}

/// Persisted history settings.
pub trait SettingsRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stored settings, or defaults when none were saved.
    fn history_settings(&self) -> Result<HistorySettings, Self::Error>;

    fn save_history_settings(&self, settings: &HistorySettings) -> Result<(), Self::Error>;
}

impl<T: ClipRepository + ?Sized> ClipRepository for std::sync::Arc<T> {
    type Error = T::Error;

    fn append(&self, clip: NewClip) -> Result<ClipRecord, Self::Error> {
        (**self).append(clip)
    }

    fn get(&self, id: ClipId) -> Result<ClipRecord, Self::Error> {
        (**self).get(id)
    }

    fn list(&self, filter: &ClipFilter, limit: usize) -> Result<Vec<ClipRecord>, Self::Error> {
        (**self).list(filter, limit)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ClipRecord>, Self::Error> {
        (**self).recent(limit)
    }

    fn set_pinned(&self, id: ClipId, pinned: bool) -> Result<(), Self::Error> {
        (**self).set_pinned(id, pinned)
    }

    fn delete(&self, id: ClipId) -> Result<(), Self::Error> {
        (**self).delete(id)
    }

    fn delete_all(&self) -> Result<usize, Self::Error> {
        (**self).delete_all()
    }

    fn purge_older_than(&self, threshold: DateTime<Utc>) -> Result<usize, Self::Error> {
        (**self).purge_older_than(threshold)
    }

    fn trim_to(&self, max_items: usize) -> Result<usize, Self::Error> {
        (**self).trim_to(max_items)
    }

    fn count(&self) -> Result<usize, Self::Error> {
        (**self).count()
    }
}

impl<T: ExclusionRepository + ?Sized> ExclusionRepository for std::sync::Arc<T> {
    type Error = T::Error;

    fn add_exclusion(
        &self,
        app_identifier: &str,
        display_name: Option<&str>,
    ) -> Result<bool, Self::Error> {
        (**self).add_exclusion(app_identifier, display_name)
    }

    fn remove_exclusion(&self, app_identifier: &str) -> Result<bool, Self::Error> {
        (**self).remove_exclusion(app_identifier)
    }

    fn list_exclusions(&self) -> Result<Vec<ExclusionEntry>, Self::Error> {
        (**self).list_exclusions()
    }

    fn is_excluded(&self, app_identifier: &str) -> Result<bool, Self::Error> {
        (**self).is_excluded(app_identifier)
    }

    fn clear_exclusions(&self) -> Result<usize, Self::Error> {
        (**self).clear_exclusions()
    }
}

impl<T: SettingsRepository + ?Sized> SettingsRepository for std::sync::Arc<T> {
    type Error = T::Error;

    fn history_settings(&self) -> Result<HistorySettings, Self::Error> {
        (**self).history_settings()
    }

    fn save_history_settings(&self, settings: &HistorySettings) -> Result<(), Self::Error> {
        (**self).save_history_settings(settings)
    }
}
