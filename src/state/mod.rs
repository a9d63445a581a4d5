//! State management module
//!
//! This module contains the timer state machine, the named registry, the
//! spotlight arbiter and the shared application state tying them together.

pub mod app_state;
pub mod registry;
pub mod spotlight;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, StateError, TickStatus, TimerSnapshot};
pub use registry::{RegistryError, TimerRegistry};
pub use spotlight::{arbitrate, SpotlightEntry, SpotlightState};
pub use timer::{Lap, TimerEngine, TimerError};
