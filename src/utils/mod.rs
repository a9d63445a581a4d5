//! Shared utilities

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::duration_text;
pub use signals::shutdown_signal;
