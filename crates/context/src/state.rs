//! Foreground application state.

use serde::{Deserialize, Serialize};

/// Information about the currently focused application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Bundle ID (e.g., "com.apple.TextEdit")
    pub bundle_id: String,

    /// Display name (e.g., "TextEdit")
    pub name: Option<String>,
}

impl AppInfo {
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the identifier is usable as a gate key.
    pub fn is_resolved(&self) -> bool {
        !self.bundle_id.trim().is_empty()
    }
}
