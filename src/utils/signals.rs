//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::info;

/// Wait for the first shutdown signal (SIGTERM, SIGINT or SIGQUIT) and
/// return its number
pub async fn shutdown_signal() -> i32 {
    let mut signals =
        Signals::new([SIGTERM, SIGINT, SIGQUIT]).expect("Failed to create signal handler");

    match signals.next().await {
        Some(signal) => {
            info!("timestack received signal {}, shutting down", signal);
            signal
        }
        None => {
            info!("Signal stream closed, shutting down");
            0
        }
    }
}
