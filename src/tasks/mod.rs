//! Background tasks module
//!
//! This module contains the per-timer tick tasks that run alongside the HTTP
//! server.

pub mod ticker;

// Re-export main functions
pub use ticker::spawn_ticker;
