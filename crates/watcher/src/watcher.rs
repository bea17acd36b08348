//! The capture pipeline and its polling thread.

use crate::clock::{Clock, SystemClock};
use crate::config::WatcherConfig;
use crate::dedup::DedupWindow;
use crate::extract::{default_extractors, extract_first, Extracted, Extractor};
use crate::pasteboard::{ImageData, ImageFormat, Pasteboard, PasteboardError};
use crate::retention::{RetentionPolicy, SweepReport};
use clipkeep_classify::{classify, extract_host, parse_color};
use clipkeep_context::{platform, ActiveAppProvider, ExclusionGate, GateDecision};
use clipkeep_events::{EventBusRef, HistoryChangedEvent, NullEventBus};
use clipkeep_history::{
    ClipRecord, ClipRepository, ContentType, ExclusionRepository, NewClip, SettingsRepository,
};
use crossbeam_channel::{select, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

/// Floor for timer intervals; `tick` cannot run at zero.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Everything the watcher needs from persistence.
pub trait HistoryStore:
    ClipRepository + ExclusionRepository + SettingsRepository + Clone + 'static
{
}

impl<T> HistoryStore for T where
    T: ClipRepository + ExclusionRepository + SettingsRepository + Clone + 'static
{
}

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to spawn watcher thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Stopped,
    Running,
}

/// How a single check ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Change counter did not move.
    Unchanged,
    /// No supported representation on the clipboard.
    NoContent,
    /// Foreground app could not be resolved.
    NoForegroundApp,
    /// Foreground app is on the exclusion list.
    Excluded,
    /// Same content and type captured inside the dedup window.
    Duplicate,
    Captured(ClipRecord),
    /// Reading recent history or appending failed. Not retried.
    StorageFailed(String),
}

impl CaptureOutcome {
    pub fn record(&self) -> Option<&ClipRecord> {
        match self {
            CaptureOutcome::Captured(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured(_))
    }
}

struct CaptureCore<S> {
    store: S,
    gate: ExclusionGate<S>,
    pasteboard: Box<dyn Pasteboard>,
    provider: Arc<dyn ActiveAppProvider>,
    extractors: Vec<Box<dyn Extractor>>,
    dedup: DedupWindow,
    events: EventBusRef,
    clock: Arc<dyn Clock>,
    last_change_count: i64,
}

impl<S: HistoryStore> CaptureCore<S> {
    /// One pass of the capture procedure. The counter is adopted before any
    /// step can reject the change, so a rejected change is never reprocessed.
    fn tick(&mut self) -> CaptureOutcome {
        let count = self.pasteboard.change_count();
        if count == self.last_change_count {
            return CaptureOutcome::Unchanged;
        }
        self.last_change_count = count;

        let Some(extracted) = extract_first(&self.extractors, self.pasteboard.as_mut()) else {
            tracing::trace!(change_count = count, "No supported clipboard representation");
            return CaptureOutcome::NoContent;
        };

        let app = self.provider.get_active_app();
        let source_app = match self.gate.check(app.as_ref()) {
            GateDecision::Allow(bundle_id) => bundle_id,
            GateDecision::Excluded => return CaptureOutcome::Excluded,
            GateDecision::Unresolved => {
                tracing::debug!(change_count = count, "Foreground app unresolved, skipping capture");
                return CaptureOutcome::NoForegroundApp;
            }
        };

        let now = self.clock.now();
        let clip = build_clip(extracted, source_app, now);

        let recent = match self.store.recent(self.dedup.lookback) {
            Ok(recent) => recent,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load recent history");
                return CaptureOutcome::StorageFailed(e.to_string());
            }
        };
        if self.dedup.is_duplicate(&clip, &recent, now) {
            tracing::debug!(content_type = %clip.content_type, "Duplicate capture suppressed");
            return CaptureOutcome::Duplicate;
        }

        match self.store.append(clip) {
            Ok(record) => {
                tracing::debug!(
                    id = record.id,
                    content_type = %record.content_type,
                    source_app = record.source_app.as_deref(),
                    bytes = record.content.len(),
                    "Clip captured"
                );
                HistoryChangedEvent::new(record.clone()).emit(self.events.as_ref());
                CaptureOutcome::Captured(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store clip");
                CaptureOutcome::StorageFailed(e.to_string())
            }
        }
    }

    /// Apply the stored retention settings. `force` ignores `auto_cleanup`.
    fn sweep(&self, force: bool) -> Option<SweepReport> {
        let settings = match self.store.history_settings() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load history settings, skipping sweep");
                return None;
            }
        };
        if !force && !settings.auto_cleanup {
            return None;
        }

        match RetentionPolicy::from(&settings).sweep(&self.store, self.clock.now()) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "Retention sweep failed");
                None
            }
        }
    }

    fn copy_record(&mut self, record: &ClipRecord) -> Result<(), PasteboardError> {
        match record.content_type {
            ContentType::Image => {
                let bytes = record
                    .preview_bytes
                    .clone()
                    .filter(|b| !b.is_empty())
                    .ok_or(PasteboardError::Unsupported("image record without preview bytes"))?;
                let format = record
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get("format"))
                    .and_then(|v| v.as_str())
                    .and_then(ImageFormat::from_name)
                    .unwrap_or(ImageFormat::Png);
                self.pasteboard.write_image(&ImageData { bytes, format })?;
            }
            ContentType::FilePath => {
                let paths = absolute_paths(&record.content);
                let written = match paths {
                    Some(paths) => match self.pasteboard.write_file_paths(&paths) {
                        Err(PasteboardError::Unsupported(_)) => false,
                        other => other.map(|()| true)?,
                    },
                    None => false,
                };
                if !written {
                    self.pasteboard.write_text(&record.content)?;
                }
            }
            _ => self.pasteboard.write_text(&record.content)?,
        }

        // Our own write must not come back as a capture.
        self.last_change_count = self.pasteboard.change_count();
        tracing::debug!(id = record.id, content_type = %record.content_type, "Clip copied to clipboard");
        Ok(())
    }
}

/// Lines of `content` as absolute paths, or `None` if any line is not one.
fn absolute_paths(content: &str) -> Option<Vec<String>> {
    let paths: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    (!paths.is_empty() && paths.iter().all(|p| p.starts_with('/'))).then_some(paths)
}

fn build_clip(extracted: Extracted, source_app: String, now: chrono::DateTime<chrono::Utc>) -> NewClip {
    let content_type = extracted
        .content_type
        .unwrap_or_else(|| classify(&extracted.content));

    let metadata = match (&extracted.image, content_type) {
        (Some(image), _) => Some(serde_json::json!({
            "format": image.format.as_str(),
            "bytes": image.bytes.len(),
        })),
        (None, ContentType::Color) => {
            parse_color(&extracted.content).and_then(|rgba| serde_json::to_value(rgba).ok())
        }
        (None, ContentType::Url) => {
            extract_host(&extracted.content).map(|host| serde_json::json!({ "host": host }))
        }
        _ => None,
    };

    let mut clip = NewClip::new(extracted.content, content_type, now).with_source_app(source_app);
    clip.metadata = metadata;
    clip.preview_bytes = extracted.image.map(|image| image.bytes);
    clip
}

fn lock<S>(core: &Mutex<CaptureCore<S>>) -> MutexGuard<'_, CaptureCore<S>> {
    core.lock().unwrap_or_else(|e| e.into_inner())
}

/// Polls the clipboard and records accepted changes.
///
/// Ticks run on one background thread and share a lock with [`check_now`],
/// so two checks never overlap. Missed timer ticks are dropped rather than
/// queued.
///
/// [`check_now`]: PasteboardWatcher::check_now
pub struct PasteboardWatcher<S: HistoryStore> {
    store: S,
    core: Arc<Mutex<CaptureCore<S>>>,
    config: WatcherConfig,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl<S: HistoryStore> PasteboardWatcher<S> {
    pub fn builder(store: S, pasteboard: impl Pasteboard + 'static) -> WatcherBuilder<S> {
        WatcherBuilder::new(store, pasteboard)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn state(&self) -> WatcherState {
        if self.handle.is_some() {
            WatcherState::Running
        } else {
            WatcherState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == WatcherState::Running
    }

    /// Begin polling. Runs a retention sweep first. Calling while running is a no-op.
    pub fn start(&mut self) -> Result<(), WatcherError> {
        if self.handle.is_some() {
            tracing::warn!("PasteboardWatcher already running");
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let core = Arc::clone(&self.core);
        let poll_interval = self.config.poll_interval.max(MIN_INTERVAL);
        let sweep_interval = self.config.sweep_interval.max(MIN_INTERVAL);

        let handle = std::thread::Builder::new()
            .name("clipkeep-watcher".into())
            .spawn(move || {
                tracing::info!(?poll_interval, ?sweep_interval, "PasteboardWatcher started");
                lock(&core).sweep(false);

                let ticker = crossbeam_channel::tick(poll_interval);
                let sweeper = crossbeam_channel::tick(sweep_interval);
                loop {
                    select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            lock(&core).tick();
                        },
                        recv(sweeper) -> _ => {
                            lock(&core).sweep(false);
                        },
                    }
                }

                tracing::info!("PasteboardWatcher stopped");
            })?;

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop polling. Returns after any in-flight tick finishes; no tick runs
    /// afterwards. Calling while stopped is a no-op.
    pub fn stop(&mut self) {
        // Disconnecting the channel wakes the select.
        drop(self.shutdown.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("PasteboardWatcher thread panicked");
            }
        }
    }

    /// Run one capture check immediately, outside the timer.
    pub fn check_now(&self) -> CaptureOutcome {
        lock(&self.core).tick()
    }

    /// Run the retention sweep now, regardless of `auto_cleanup`.
    pub fn sweep_now(&self) -> Option<SweepReport> {
        lock(&self.core).sweep(true)
    }

    /// Put a stored record back on the clipboard without re-capturing it.
    pub fn copy_to_pasteboard(&self, record: &ClipRecord) -> Result<(), PasteboardError> {
        lock(&self.core).copy_record(record)
    }
}

impl<S: HistoryStore> Drop for PasteboardWatcher<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Assembles a [`PasteboardWatcher`].
///
/// Defaults: platform foreground-app provider, no event sink, wall clock,
/// [`WatcherConfig::default`], and the standard extractor order.
pub struct WatcherBuilder<S> {
    store: S,
    pasteboard: Box<dyn Pasteboard>,
    provider: Option<Arc<dyn ActiveAppProvider>>,
    events: Option<EventBusRef>,
    clock: Option<Arc<dyn Clock>>,
    extractors: Option<Vec<Box<dyn Extractor>>>,
    config: WatcherConfig,
}

impl<S: HistoryStore> WatcherBuilder<S> {
    pub fn new(store: S, pasteboard: impl Pasteboard + 'static) -> Self {
        Self {
            store,
            pasteboard: Box::new(pasteboard),
            provider: None,
            events: None,
            clock: None,
            extractors: None,
            config: WatcherConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ActiveAppProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn events(mut self, events: EventBusRef) -> Self {
        self.events = Some(events);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn extractors(mut self, extractors: Vec<Box<dyn Extractor>>) -> Self {
        self.extractors = Some(extractors);
        self
    }

    pub fn config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Content already on the clipboard at build time is not captured.
    pub fn build(self) -> PasteboardWatcher<S> {
        let mut pasteboard = self.pasteboard;
        let last_change_count = pasteboard.change_count();

        let core = CaptureCore {
            store: self.store.clone(),
            gate: ExclusionGate::new(self.store.clone()),
            pasteboard,
            provider: self
                .provider
                .unwrap_or_else(|| Arc::new(platform::platform_provider()) as Arc<dyn ActiveAppProvider>),
            extractors: self.extractors.unwrap_or_else(default_extractors),
            dedup: self.config.dedup,
            events: self.events.unwrap_or_else(|| Arc::new(NullEventBus) as EventBusRef),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            last_change_count,
        };

        PasteboardWatcher {
            store: self.store,
            core: Arc::new(Mutex::new(core)),
            config: self.config,
            shutdown: None,
            handle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn text(content: &str) -> Extracted {
        Extracted {
            content: content.to_string(),
            content_type: None,
            image: None,
        }
    }

    #[test]
    fn test_build_clip_classifies_text() {
        let clip = build_clip(text("hello"), "com.apple.TextEdit".into(), at());
        assert_eq!(clip.content_type, ContentType::Text);
        assert_eq!(clip.source_app.as_deref(), Some("com.apple.TextEdit"));
        assert_eq!(clip.captured_at, at());
        assert_eq!(clip.metadata, None);
    }

    #[test]
    fn test_build_clip_color_metadata() {
        let clip = build_clip(text("#FF00AA"), "app".into(), at());
        assert_eq!(clip.content_type, ContentType::Color);
        let meta = clip.metadata.unwrap();
        assert_eq!(meta["red"], 255);
        assert_eq!(meta["green"], 0);
        assert_eq!(meta["blue"], 170);
    }

    #[test]
    fn test_build_clip_url_metadata() {
        let clip = build_clip(text("https://Docs.rs/regex"), "app".into(), at());
        assert_eq!(clip.content_type, ContentType::Url);
        assert_eq!(clip.metadata.unwrap()["host"], "docs.rs");
    }

    #[test]
    fn test_build_clip_image_keeps_fixed_type() {
        let extracted = Extracted {
            content: "hello".into(),
            content_type: Some(ContentType::Image),
            image: Some(ImageData::png(vec![1, 2, 3])),
        };
        let clip = build_clip(extracted, "app".into(), at());
        assert_eq!(clip.content_type, ContentType::Image);
        assert_eq!(clip.preview_bytes, Some(vec![1, 2, 3]));
        let meta = clip.metadata.unwrap();
        assert_eq!(meta["format"], "png");
        assert_eq!(meta["bytes"], 3);
    }

    #[test]
    fn test_absolute_paths() {
        assert_eq!(
            absolute_paths("/a/b.txt\n/c/d.png"),
            Some(vec!["/a/b.txt".to_string(), "/c/d.png".to_string()])
        );
        assert_eq!(absolute_paths("notes.md"), None);
        assert_eq!(absolute_paths("~/Documents"), None);
        assert_eq!(absolute_paths(""), None);
    }

    #[test]
    fn test_outcome_helpers() {
        let record = ClipRecord::from_new(1, NewClip::new("x", ContentType::Text, at()));
        let outcome = CaptureOutcome::Captured(record.clone());
        assert!(outcome.is_captured());
        assert_eq!(outcome.record(), Some(&record));
        assert_eq!(CaptureOutcome::Duplicate.record(), None);
    }
}
