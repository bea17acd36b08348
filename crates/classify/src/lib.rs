//! Content-type classification for clipboard text.
//!
//! Pure, stateless and deterministic. Rules are evaluated in a fixed order
//! and the first match wins:
//!
//! 1. empty or whitespace-only -> `Unknown`
//! 2. `http`/`https`/`ftp` URL -> `Url`
//! 3. `#RGB`, `#RRGGBB`, `rgb(..)`, `rgba(..)` -> `Color`
//! 4. absolute/home path or bare `name.ext` -> `FilePath`
//! 5. anything else -> `Text`
//!
//! Input is trimmed of surrounding whitespace before any rule runs.
//! Classification never fails.

mod color;

pub use color::{parse_color, Rgba};

use clipkeep_history::ContentType;
use regex::Regex;
use std::sync::OnceLock;

static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
static HOST_PATTERN: OnceLock<Regex> = OnceLock::new();
static HEX_COLOR_PATTERN: OnceLock<Regex> = OnceLock::new();
static RGB_PATTERN: OnceLock<Regex> = OnceLock::new();
static RGBA_PATTERN: OnceLock<Regex> = OnceLock::new();
static FILE_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Prefix of inline image payloads (`data:image/png;base64,...`).
pub const IMAGE_DATA_MARKER: &str = "data:image/";

fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| {
        Regex::new(
            r"^(https?|ftp)://[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
        )
        .expect("invalid URL regex")
    })
}

fn host_pattern() -> &'static Regex {
    HOST_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:https?|ftp)://(?:[^@/\s]*@)?([^:/?#\s]+)").expect("invalid host regex")
    })
}

pub(crate) fn hex_color_pattern() -> &'static Regex {
    HEX_COLOR_PATTERN.get_or_init(|| {
        Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("invalid hex color regex")
    })
}

fn rgb_pattern() -> &'static Regex {
    RGB_PATTERN.get_or_init(|| {
        Regex::new(r"^rgb\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)$").expect("invalid rgb regex")
    })
}

fn rgba_pattern() -> &'static Regex {
    RGBA_PATTERN.get_or_init(|| {
        Regex::new(r"^rgba\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*,\s*[0-9.]+\s*\)$")
            .expect("invalid rgba regex")
    })
}

fn file_name_pattern() -> &'static Regex {
    FILE_NAME_PATTERN
        .get_or_init(|| Regex::new(r"^.+\.[a-zA-Z0-9]{2,4}$").expect("invalid file name regex"))
}

/// Classify clipboard text into a semantic content type.
pub fn classify(text: &str) -> ContentType {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return ContentType::Unknown;
    }
    if is_url(trimmed) {
        return ContentType::Url;
    }
    if is_color(trimmed) {
        return ContentType::Color;
    }
    if is_file_path(trimmed) {
        return ContentType::FilePath;
    }
    ContentType::Text
}

pub fn is_url(text: &str) -> bool {
    url_pattern().is_match(text.trim())
}

pub fn is_color(text: &str) -> bool {
    let trimmed = text.trim();
    hex_color_pattern().is_match(trimmed)
        || rgb_pattern().is_match(trimmed)
        || rgba_pattern().is_match(trimmed)
}

pub fn is_file_path(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.starts_with('/') || trimmed.starts_with('~') {
        return true;
    }
    file_name_pattern().is_match(trimmed) && !trimmed.contains("://")
}

/// Whether clipboard text is an inline image payload worth pairing with image bytes.
pub fn is_image_data_marker(text: &str) -> bool {
    text.trim_start()
        .get(..IMAGE_DATA_MARKER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_DATA_MARKER))
}

/// Lowercased host of a URL, e.g. `https://Docs.rs/regex` -> `docs.rs`.
pub fn extract_host(url: &str) -> Option<String> {
    host_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .filter(|host| !host.is_empty())
}
