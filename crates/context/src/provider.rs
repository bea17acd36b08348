//! Provider trait for foreground application detection.
//!
//! Abstracts the platform query so the gate and watcher remain testable.

use crate::state::AppInfo;
use std::sync::{Arc, Mutex};

/// Provider for detecting the currently focused application.
pub trait ActiveAppProvider: Send + Sync {
    /// The focused regular application, or `None` when it cannot be resolved.
    fn get_active_app(&self) -> Option<AppInfo>;
}

impl<T: ActiveAppProvider + ?Sized> ActiveAppProvider for Arc<T> {
    fn get_active_app(&self) -> Option<AppInfo> {
        (**self).get_active_app()
    }
}

/// Null implementation for unsupported platforms. Never resolves an app.
pub struct NullProvider;

impl ActiveAppProvider for NullProvider {
    fn get_active_app(&self) -> Option<AppInfo> {
        None
    }
}

/// Provider returning whatever app was last set. Used by tests and hosts
/// that learn the foreground app from elsewhere.
#[derive(Debug, Default)]
pub struct FixedAppProvider {
    app: Mutex<Option<AppInfo>>,
}

impl FixedAppProvider {
    pub fn new(app: Option<AppInfo>) -> Self {
        Self {
            app: Mutex::new(app),
        }
    }

    pub fn with_bundle_id(bundle_id: &str) -> Self {
        Self::new(Some(AppInfo::new(bundle_id)))
    }

    pub fn set(&self, app: Option<AppInfo>) {
        if let Ok(mut guard) = self.app.lock() {
            *guard = app;
        }
    }
}

impl ActiveAppProvider for FixedAppProvider {
    fn get_active_app(&self) -> Option<AppInfo> {
        self.app.lock().ok().and_then(|guard| guard.clone())
    }
}
