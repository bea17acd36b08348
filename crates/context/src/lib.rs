//! Foreground application awareness for clipkeep.
//!
//! Answers one question per capture attempt: which regular application is
//! focused right now, and is it allowed to have its clipboard output recorded?
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  state.rs    - AppInfo                                      │
//! │  provider.rs - ActiveAppProvider trait, null/fixed impls    │
//! │  gate.rs     - ExclusionGate over an ExclusionRepository    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                        │
//! │  platform/macos.rs - NSWorkspace frontmost app lookup       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use clipkeep_context::{platform, ActiveAppProvider, ExclusionGate};
//!
//! let provider = platform::platform_provider();
//! let gate = ExclusionGate::new(db);
//! let decision = gate.check(provider.get_active_app().as_ref());
//! ```

mod gate;
mod provider;
mod state;

pub mod platform;

pub use gate::{ExclusionGate, GateDecision};
pub use provider::{ActiveAppProvider, FixedAppProvider, NullProvider};
pub use state::AppInfo;
