//! Per-timer tick source
//!
//! One task per running timer delivers one tick per second to the engine.
//! The handle is registered on the shared state so pause, reset and delete
//! can cancel it synchronously; the loop also exits on its own once a tick
//! reports that the timer stopped, so a stray tick is a dropped no-op.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::state::{AppState, TickStatus};

/// Spawn the one-second ticker driving `name` and register its handle
pub fn spawn_ticker(state: &Arc<AppState>, name: &str) {
    let task_state = Arc::clone(state);
    let task_name = name.to_string();
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // the first interval tick completes immediately; consume it so the
        // first increment lands a full second after start
        interval.tick().await;
        loop {
            interval.tick().await;
            if task_state.tick(&task_name) == TickStatus::Stopped {
                debug!("Ticker for {:?} stopped", task_name);
                break;
            }
        }
    });
    state.register_ticker(name, handle);
}
