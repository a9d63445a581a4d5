//! Timestack - a state-managed HTTP server for personal multi-stopwatches
//!
//! This library provides named stopwatch timers with pause/resume, pomodoro
//! countdown overlays, labeled laps, persistence across restarts and a
//! spotlight arbiter picking the single timer shown in the page-level title.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
