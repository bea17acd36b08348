//! Ordered clipboard extractors.
//!
//! Each extractor looks for one representation. The watcher tries them in a
//! fixed priority order and takes the first hit: text, then image, then file
//! list.

use crate::pasteboard::{ImageData, Pasteboard};
use clipkeep_classify::is_image_data_marker;
use clipkeep_history::ContentType;

/// Placeholder content for image captures without a textual representation.
pub const IMAGE_PLACEHOLDER: &str = "[Image]";

/// A candidate item pulled off the clipboard, before gating and dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub content: String,
    /// Set when the representation implies the type; otherwise the
    /// classifier decides.
    pub content_type: Option<ContentType>,
    pub image: Option<ImageData>,
}

pub trait Extractor: Send {
    fn name(&self) -> &'static str;

    fn extract(&self, pasteboard: &mut dyn Pasteboard) -> Option<Extracted>;
}

/// Plain text. Text that looks like an inline image payload is paired with
/// the clipboard's image bytes when they exist.
pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(&self, pasteboard: &mut dyn Pasteboard) -> Option<Extracted> {
        let text = pasteboard.read_text().filter(|t| !t.is_empty())?;

        if is_image_data_marker(&text) {
            if let Some(image) = pasteboard.read_image() {
                return Some(Extracted {
                    content: text,
                    content_type: Some(ContentType::Image),
                    image: Some(image),
                });
            }
        }

        Some(Extracted {
            content: text,
            content_type: None,
            image: None,
        })
    }
}

/// Raw image bytes with no text alongside.
pub struct ImageExtractor;

impl Extractor for ImageExtractor {
    fn name(&self) -> &'static str {
        "image"
    }

    fn extract(&self, pasteboard: &mut dyn Pasteboard) -> Option<Extracted> {
        let image = pasteboard.read_image().filter(|i| !i.bytes.is_empty())?;
        Some(Extracted {
            content: IMAGE_PLACEHOLDER.to_string(),
            content_type: Some(ContentType::Image),
            image: Some(image),
        })
    }
}

/// File references, one path per line.
pub struct FileListExtractor;

impl Extractor for FileListExtractor {
    fn name(&self) -> &'static str {
        "files"
    }

    fn extract(&self, pasteboard: &mut dyn Pasteboard) -> Option<Extracted> {
        let paths = pasteboard.read_file_paths().filter(|p| !p.is_empty())?;
        Some(Extracted {
            content: paths.join("\n"),
            content_type: Some(ContentType::FilePath),
            image: None,
        })
    }
}

/// Extractors in capture priority order.
pub fn default_extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(TextExtractor),
        Box::new(ImageExtractor),
        Box::new(FileListExtractor),
    ]
}

/// First hit across `extractors`, in order.
pub fn extract_first(
    extractors: &[Box<dyn Extractor>],
    pasteboard: &mut dyn Pasteboard,
) -> Option<Extracted> {
    extractors.iter().find_map(|extractor| {
        let hit = extractor.extract(pasteboard);
        if hit.is_some() {
            tracing::trace!(extractor = extractor.name(), "Clipboard representation found");
        }
        hit
    })
}
