//! macOS implementation of foreground application detection.

use crate::provider::ActiveAppProvider;
use crate::state::AppInfo;

use objc::rc::autoreleasepool;
use objc::runtime::{Class, Object, BOOL, NO};
use objc::{msg_send, sel, sel_impl};

/// `NSApplicationActivationPolicyRegular`: apps with a Dock icon and menu bar.
const ACTIVATION_POLICY_REGULAR: isize = 0;

/// macOS provider backed by `NSWorkspace`.
///
/// Only regular applications count. Agents, menu-bar extras and background
/// helpers are skipped so they can never stand in for the app the user is
/// copying from.
#[derive(Debug, Default)]
pub struct MacOSProvider;

impl MacOSProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ActiveAppProvider for MacOSProvider {
    fn get_active_app(&self) -> Option<AppInfo> {
        autoreleasepool(|| unsafe { frontmost_regular_app() })
    }
}

/// Resolve the focused regular application.
///
/// Tries `frontmostApplication` first, then scans `runningApplications`
/// for a regular app that reports itself active.
unsafe fn frontmost_regular_app() -> Option<AppInfo> {
    let workspace_class = Class::get("NSWorkspace")?;
    let workspace: *mut Object = msg_send![workspace_class, sharedWorkspace];
    if workspace.is_null() {
        return None;
    }

    let frontmost: *mut Object = msg_send![workspace, frontmostApplication];
    if !frontmost.is_null() && is_regular(frontmost) {
        if let Some(app) = app_info(frontmost) {
            return Some(app);
        }
    }

    let running: *mut Object = msg_send![workspace, runningApplications];
    if running.is_null() {
        return None;
    }
    let count: usize = msg_send![running, count];
    for idx in 0..count {
        let app: *mut Object = msg_send![running, objectAtIndex: idx];
        if app.is_null() || !is_regular(app) {
            continue;
        }
        let active: BOOL = msg_send![app, isActive];
        if active != NO {
            return app_info(app);
        }
    }
    None
}

unsafe fn is_regular(app: *mut Object) -> bool {
    let policy: isize = msg_send![app, activationPolicy];
    policy == ACTIVATION_POLICY_REGULAR
}

unsafe fn app_info(app: *mut Object) -> Option<AppInfo> {
    let bundle_id_ns: *mut Object = msg_send![app, bundleIdentifier];
    let bundle_id = nsstring_to_string(bundle_id_ns)?;
    if bundle_id.is_empty() {
        return None;
    }

    let name_ns: *mut Object = msg_send![app, localizedName];
    let name = nsstring_to_string(name_ns);

    Some(AppInfo { bundle_id, name })
}

/// Convert NSString to Rust String.
unsafe fn nsstring_to_string(nsstring: *mut Object) -> Option<String> {
    if nsstring.is_null() {
        return None;
    }

    let c_str: *const std::os::raw::c_char = msg_send![nsstring, UTF8String];
    if c_str.is_null() {
        return None;
    }

    let rust_str = std::ffi::CStr::from_ptr(c_str).to_str().ok()?;
    Some(rust_str.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_active_app_smoke() {
        // Result depends on whatever is focused while tests run.
        let app = MacOSProvider::new().get_active_app();
        if let Some(app) = app {
            assert!(app.is_resolved());
        }
    }
}
