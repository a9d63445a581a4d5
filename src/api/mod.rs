//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler).post(create_timer_handler))
        .route(
            "/timers/:name",
            get(get_timer_handler).delete(delete_timer_handler),
        )
        .route("/timers/:name/start", post(start_timer_handler))
        .route("/timers/:name/pause", post(pause_timer_handler))
        .route("/timers/:name/reset", post(reset_timer_handler))
        .route("/timers/:name/countdown", post(countdown_handler))
        .route("/timers/:name/laps", post(add_lap_handler))
        .route(
            "/timers/:name/laps/:index",
            put(rename_lap_handler).delete(delete_lap_handler),
        )
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
