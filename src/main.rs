//! Timestack - a state-managed HTTP server for personal multi-stopwatches
//!
//! This is the main entry point for the timestack application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use timestack::{
    api::create_router,
    config::Config,
    services::{check_notifier_available, DesktopNotifier},
    state::AppState,
    storage::{JsonFileStore, TimerStore},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timestack={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timestack server v1.0.0");
    info!(
        "Configuration: host={}, port={}, data_file={}",
        config.host, config.port, config.data_file
    );

    // Countdown notifications are best-effort; a missing notifier only warns
    check_notifier_available().await;

    // Open the persistent store and restore any saved timers (paused)
    let store = TimerStore::new(Arc::new(JsonFileStore::open(&config.data_file)));
    let state = Arc::new(AppState::new(
        store,
        Arc::new(DesktopNotifier::new()),
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers                    - Create a timer");
    info!("  GET    /timers                    - List timers");
    info!("  GET    /timers/:name              - One timer's full state");
    info!("  DELETE /timers/:name              - Delete a timer");
    info!("  POST   /timers/:name/start        - Start or resume");
    info!("  POST   /timers/:name/pause        - Pause");
    info!("  POST   /timers/:name/reset        - Reset to idle");
    info!("  POST   /timers/:name/countdown    - Toggle pomodoro countdown");
    info!("  POST   /timers/:name/laps         - Record a lap");
    info!("  PUT    /timers/:name/laps/:index  - Rename a lap");
    info!("  DELETE /timers/:name/laps/:index  - Delete a lap");
    info!("  GET    /status                    - Spotlight and server status");
    info!("  GET    /health                    - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
