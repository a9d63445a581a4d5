//! External side-effect collaborators
//!
//! This module contains the notification channel fired when a countdown
//! completes.

pub mod notifier;

// Re-export main types
pub use notifier::{check_notifier_available, DesktopNotifier, Notifier};
