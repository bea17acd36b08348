//! Applications excluded from capture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One application whose clipboard output is never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionEntry {
    pub id: i64,
    /// Bundle/package identifier, unique across entries.
    pub app_identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Credential managers excluded on a fresh install: (bundle id, display name).
pub const DEFAULT_EXCLUDED_APPS: &[(&str, &str)] = &[
    ("com.1password.1password", "1Password"),
    ("com.agilebits.onepassword7", "1Password 7"),
    ("com.apple.keychainaccess", "Keychain Access"),
    ("com.apple.Passwords", "Passwords"),
    ("com.bitwarden.desktop", "Bitwarden"),
    ("com.lastpass.LastPass", "LastPass"),
    ("com.dashlane.dashlanephonefinal", "Dashlane"),
    ("com.callpod.keepermac.lite", "Keeper"),
    ("org.keepassxc.keepassxc", "KeePassXC"),
];
