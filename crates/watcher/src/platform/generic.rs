//! `arboard` adapter for platforms without a native change counter.
//!
//! The counter is synthesized: each call fingerprints the current text and
//! image and bumps the count when the fingerprint moves. Copying identical
//! content twice therefore registers as a single change.

use crate::pasteboard::{ImageData, ImageFormat, Pasteboard, PasteboardError, Result};
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;

#[derive(Debug, Default)]
pub struct ArboardPasteboard {
    fingerprint: Option<u64>,
    change_count: i64,
}

impl ArboardPasteboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn clipboard() -> Option<arboard::Clipboard> {
        arboard::Clipboard::new()
            .map_err(|e| tracing::trace!(error = %e, "Clipboard unavailable"))
            .ok()
    }

    fn current_fingerprint() -> u64 {
        let mut hasher = DefaultHasher::new();
        if let Some(mut clipboard) = Self::clipboard() {
            clipboard.get_text().ok().hash(&mut hasher);
            if let Ok(image) = clipboard.get_image() {
                image.width.hash(&mut hasher);
                image.height.hash(&mut hasher);
                image.bytes.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl Pasteboard for ArboardPasteboard {
    fn change_count(&mut self) -> i64 {
        let fingerprint = Self::current_fingerprint();
        match self.fingerprint {
            Some(previous) if previous == fingerprint => {}
            Some(_) => {
                self.fingerprint = Some(fingerprint);
                self.change_count += 1;
            }
            None => self.fingerprint = Some(fingerprint),
        }
        self.change_count
    }

    fn read_text(&mut self) -> Option<String> {
        Self::clipboard()?.get_text().ok()
    }

    fn read_image(&mut self) -> Option<ImageData> {
        let image = Self::clipboard()?.get_image().ok()?;
        match encode_png(image.width, image.height, &image.bytes) {
            Ok(bytes) => Some(ImageData::png(bytes)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode clipboard image");
                None
            }
        }
    }

    fn read_file_paths(&mut self) -> Option<Vec<String>> {
        None
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Self::clipboard().ok_or(PasteboardError::Unavailable)?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| PasteboardError::WriteFailed(e.to_string()))
    }

    fn write_image(&mut self, image: &ImageData) -> Result<()> {
        if image.format != ImageFormat::Png {
            return Err(PasteboardError::Unsupported("only PNG images can be written"));
        }
        let (width, height, rgba) = decode_png(&image.bytes)?;
        let mut clipboard = Self::clipboard().ok_or(PasteboardError::Unavailable)?;
        clipboard
            .set_image(arboard::ImageData {
                width,
                height,
                bytes: Cow::Owned(rgba),
            })
            .map_err(|e| PasteboardError::WriteFailed(e.to_string()))
    }

    fn write_file_paths(&mut self, _paths: &[String]) -> Result<()> {
        Err(PasteboardError::Unsupported("file lists"))
    }
}

/// Encode tightly packed 8-bit RGBA pixels as PNG.
fn encode_png(width: usize, height: usize, rgba: &[u8]) -> Result<Vec<u8>> {
    let to_u32 = |v: usize| {
        u32::try_from(v).map_err(|_| PasteboardError::WriteFailed("image too large".into()))
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, to_u32(width)?, to_u32(height)?);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| PasteboardError::WriteFailed(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| PasteboardError::WriteFailed(e.to_string()))?;
    }
    Ok(out)
}

/// Decode PNG into `(width, height, rgba)`. Grayscale and RGB are widened to RGBA.
fn decode_png(bytes: &[u8]) -> Result<(usize, usize, Vec<u8>)> {
    let invalid = |e: png::DecodingError| PasteboardError::WriteFailed(format!("invalid PNG: {e}"));

    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(invalid)?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(invalid)?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xFF])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
        png::ColorType::Indexed => {
            return Err(PasteboardError::Unsupported("indexed PNG after expansion"))
        }
    };

    Ok((info.width as usize, info.height as usize, rgba))
}
