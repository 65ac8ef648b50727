//! Shared types for the Fazantix switcher control panel.
//!
//! This crate contains the wire models exchanged with the switcher backend:
//! the startup config response, telemetry packets and pushed events.

/// Default port the switcher backend binds its API to.
pub const DEFAULT_PORT: u16 = 8000;

pub mod api;
pub mod events;
pub mod stats;

// Re-export commonly used types
pub use api::{ConfigResponse, SceneInfo, StageInfo};
pub use events::{ServerMessage, SwitcherEvent};
pub use stats::Telemetry;
