//! Clipboard history domain model.
//!
//! Pure types shared by every clipkeep crate:
//! - `record` - captured clipboard items and query filters
//! - `exclusion` - applications whose clipboard output is never recorded
//! - `settings` - user-tunable history limits
//! - `repository` - persistence contracts implemented by the storage layer
//!
//! Nothing here performs I/O.

mod exclusion;
mod record;
mod repository;
mod settings;

pub use exclusion::{ExclusionEntry, DEFAULT_EXCLUDED_APPS};
pub use record::{ClipFilter, ClipId, ClipRecord, ContentType, NewClip, ParseContentTypeError};
pub use repository::{ClipRepository, ExclusionRepository, SettingsRepository};
pub use settings::HistorySettings;
