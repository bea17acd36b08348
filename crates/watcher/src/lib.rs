//! Clipboard capture pipeline.
//!
//! A [`PasteboardWatcher`] polls the clipboard's change counter and, for each
//! change, runs a fixed procedure:
//!
//! ```text
//! counter moved? ─no─▶ done
//!      │ yes (counter adopted immediately)
//!      ▼
//! extract (text ▸ image ▸ files) ─none─▶ done
//!      ▼
//! foreground app ─unresolved/excluded─▶ done
//!      ▼
//! classify (unless extraction fixed the type)
//!      ▼
//! dedup window ─repeat─▶ done
//!      ▼
//! append ─▶ "history:changed" event
//! ```
//!
//! Every early exit is silent apart from debug logging, and clipboard content
//! never reaches the log.
//!
//! # Example
//!
//! ```ignore
//! use clipkeep_watcher::{platform, PasteboardWatcher};
//!
//! let mut watcher = PasteboardWatcher::builder(db, platform::platform_pasteboard())
//!     .events(bus)
//!     .build();
//! watcher.start()?;
//! ```

mod clock;
mod config;
mod dedup;
mod extract;
mod pasteboard;
mod retention;
mod watcher;

pub mod platform;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{WatcherConfig, DEFAULT_POLL_INTERVAL, DEFAULT_SWEEP_INTERVAL};
pub use dedup::{DedupWindow, DEFAULT_DEDUP_LOOKBACK, DEFAULT_DEDUP_WINDOW};
pub use extract::{
    default_extractors, Extracted, Extractor, FileListExtractor, ImageExtractor, TextExtractor,
    IMAGE_PLACEHOLDER,
};
pub use pasteboard::{ImageData, ImageFormat, MemoryPasteboard, Pasteboard, PasteboardError};
pub use retention::{RetentionPolicy, SweepReport};
pub use watcher::{
    CaptureOutcome, HistoryStore, PasteboardWatcher, WatcherBuilder, WatcherError, WatcherState,
};
