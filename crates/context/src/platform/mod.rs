//! Platform-specific implementations.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::MacOSProvider;

// Re-export the appropriate provider for the current platform
#[cfg(target_os = "macos")]
pub type PlatformProvider = MacOSProvider;

/// No foreground app detection outside macOS; the watcher abandons every
/// capture rather than recording from an unknown context.
#[cfg(not(target_os = "macos"))]
pub type PlatformProvider = crate::provider::NullProvider;

/// Construct the provider for the current platform.
pub fn platform_provider() -> PlatformProvider {
    #[cfg(target_os = "macos")]
    {
        MacOSProvider::new()
    }
    #[cfg(not(target_os = "macos"))]
    {
        crate::provider::NullProvider
    }
}
