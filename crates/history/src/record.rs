//! Captured clipboard records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned record identifier. Strictly increasing in insertion order.
pub type ClipId = i64;

/// Semantic type of a captured item.
///
/// Derived once at capture time and never re-classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    #[serde(rename = "rtf")]
    RichText,
    #[serde(rename = "file")]
    FilePath,
    Url,
    Color,
    Unknown,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Text,
        ContentType::Image,
        ContentType::RichText,
        ContentType::FilePath,
        ContentType::Url,
        ContentType::Color,
        ContentType::Unknown,
    ];

    /// Stable name used for persistence and event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::RichText => "rtf",
            ContentType::FilePath => "file",
            ContentType::Url => "url",
            ContentType::Color => "color",
            ContentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored content type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContentTypeError(pub String);

impl fmt::Display for ParseContentTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown content type '{}'", self.0)
    }
}

impl std::error::Error for ParseContentTypeError {}

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseContentTypeError(s.to_string()))
    }
}

/// A fully-formed capture that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClip {
    pub content: String,
    pub content_type: ContentType,
    pub source_app: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub preview_bytes: Option<Vec<u8>>,
    pub metadata: Option<serde_json::Value>,
}

impl NewClip {
    pub fn new(content: impl Into<String>, content_type: ContentType, captured_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            content_type,
            source_app: None,
            captured_at,
            preview_bytes: None,
            metadata: None,
        }
    }

    pub fn with_source_app(mut self, app: impl Into<String>) -> Self {
        self.source_app = Some(app.into());
        self
    }

    pub fn with_preview_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.preview_bytes = Some(bytes);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One captured clipboard event.
///
/// Only `pinned` is mutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    pub id: ClipId,
    pub content: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub source_app: Option<String>,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub pinned: bool,
    /// Binary preview (e.g. PNG). Not part of serialized payloads; fetch by id.
    #[serde(skip)]
    pub preview_bytes: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ClipRecord {
    /// Attach a store-assigned id to a pending capture.
    pub fn from_new(id: ClipId, clip: NewClip) -> Self {
        Self {
            id,
            content: clip.content,
            content_type: clip.content_type,
            source_app: clip.source_app,
            captured_at: clip.captured_at,
            pinned: false,
            preview_bytes: clip.preview_bytes,
            metadata: clip.metadata,
        }
    }

    /// Content truncated to `max_chars` characters for list display.
    pub fn display_text(&self, max_chars: usize) -> String {
        if self.content.is_empty() {
            return "(empty)".to_string();
        }
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.content[..idx]),
            None => self.content.clone(),
        }
    }

    /// Short application name derived from the bundle identifier,
    /// e.g. `com.apple.Safari` -> `Safari`.
    pub fn source_app_name(&self) -> Option<String> {
        let bundle_id = self.source_app.as_deref()?;
        let last = bundle_id.rsplit('.').next().filter(|s| !s.is_empty())?;
        let mut chars = last.chars();
        let first = chars.next()?;
        Some(first.to_uppercase().chain(chars).collect())
    }
}

/// Query narrowing for history listings. Both filters may combine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipFilter {
    pub content_type: Option<ContentType>,
    pub keyword: Option<String>,
}

impl ClipFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Lowercased keyword, or `None` when no keyword narrowing applies.
    pub fn normalized_keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }

    /// Case-insensitive substring match of the keyword against `content`.
    /// Always true without a keyword. Type narrowing is left to the store.
    pub fn matches_content(&self, content: &str) -> bool {
        match self.normalized_keyword() {
            Some(keyword) => content.to_lowercase().contains(&keyword),
            None => true,
        }
    }
}
