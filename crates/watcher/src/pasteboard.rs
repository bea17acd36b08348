//! System clipboard abstraction.

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasteboardError {
    #[error("clipboard is unavailable")]
    Unavailable,

    #[error("clipboard write failed: {0}")]
    WriteFailed(String),

    #[error("unsupported on this platform: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, PasteboardError>;

/// Encoded image formats the pasteboard hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Tiff,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "png" => Some(ImageFormat::Png),
            "tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }
}

/// Encoded image bytes read from or written to the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImageData {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: ImageFormat::Png,
        }
    }
}

/// Read/write access to one clipboard.
///
/// Reads return `None` when the representation is absent or unreadable;
/// an empty clipboard is the normal steady state, not an error.
pub trait Pasteboard: Send {
    /// Counter that changes whenever the clipboard contents change.
    fn change_count(&mut self) -> i64;

    fn read_text(&mut self) -> Option<String>;

    fn read_image(&mut self) -> Option<ImageData>;

    fn read_file_paths(&mut self) -> Option<Vec<String>>;

    fn write_text(&mut self, text: &str) -> Result<()>;

    fn write_image(&mut self, image: &ImageData) -> Result<()>;

    fn write_file_paths(&mut self, paths: &[String]) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryContents {
    change_count: i64,
    text: Option<String>,
    image: Option<ImageData>,
    files: Option<Vec<String>>,
}

/// In-memory clipboard for tests and headless hosts.
///
/// Clones share the same contents, so a test can keep a handle while the
/// watcher owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryPasteboard {
    inner: Arc<Mutex<MemoryContents>>,
}

impl MemoryPasteboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> MutexGuard<'_, MemoryContents> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn replace(&self, text: Option<String>, image: Option<ImageData>, files: Option<Vec<String>>) {
        let mut contents = self.contents();
        contents.text = text;
        contents.image = image;
        contents.files = files;
        contents.change_count += 1;
    }

    /// Simulate another app copying plain text.
    pub fn copy_text(&self, text: &str) {
        self.replace(Some(text.to_string()), None, None);
    }

    /// Simulate an image copy, optionally with a textual representation alongside.
    pub fn copy_image(&self, image: ImageData, text: Option<&str>) {
        self.replace(text.map(str::to_string), Some(image), None);
    }

    pub fn copy_files(&self, paths: &[&str]) {
        self.replace(None, None, Some(paths.iter().map(|p| p.to_string()).collect()));
    }

    /// Bump the counter with nothing readable on the clipboard.
    pub fn clear(&self) {
        self.replace(None, None, None);
    }

    pub fn current_count(&self) -> i64 {
        self.contents().change_count
    }

    pub fn text(&self) -> Option<String> {
        self.contents().text.clone()
    }

    pub fn image(&self) -> Option<ImageData> {
        self.contents().image.clone()
    }

    pub fn files(&self) -> Option<Vec<String>> {
        self.contents().files.clone()
    }
}

impl Pasteboard for MemoryPasteboard {
    fn change_count(&mut self) -> i64 {
        self.contents().change_count
    }

    fn read_text(&mut self) -> Option<String> {
        self.contents().text.clone()
    }

    fn read_image(&mut self) -> Option<ImageData> {
        self.contents().image.clone()
    }

    fn read_file_paths(&mut self) -> Option<Vec<String>> {
        self.contents().files.clone().filter(|f| !f.is_empty())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.copy_text(text);
        Ok(())
    }

    fn write_image(&mut self, image: &ImageData) -> Result<()> {
        self.copy_image(image.clone(), None);
        Ok(())
    }

    fn write_file_paths(&mut self, paths: &[String]) -> Result<()> {
        self.replace(None, None, Some(paths.to_vec()));
        Ok(())
    }
}
