//! Platform clipboard adapters.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(not(target_os = "macos"))]
mod generic;

#[cfg(target_os = "macos")]
pub use macos::MacPasteboard;

#[cfg(not(target_os = "macos"))]
pub use generic::ArboardPasteboard;

#[cfg(target_os = "macos")]
pub type PlatformPasteboard = MacPasteboard;

#[cfg(not(target_os = "macos"))]
pub type PlatformPasteboard = ArboardPasteboard;

/// Construct the clipboard adapter for the current platform.
pub fn platform_pasteboard() -> PlatformPasteboard {
    PlatformPasteboard::new()
}
