//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::state::{AppState, RegistryError, StateError, TimerError};
use crate::tasks::spawn_ticker;

use super::responses::{HealthResponse, ListResponse, StatusResponse, TimerResponse};

/// Request body for POST /timers
#[derive(Debug, Deserialize)]
pub struct CreateTimerRequest {
    pub name: String,
}

/// Request body for POST /timers/:name/countdown
#[derive(Debug, Deserialize)]
pub struct CountdownRequest {
    pub target_minutes: u64,
}

/// Request body for POST /timers/:name/laps
#[derive(Debug, Deserialize)]
pub struct AddLapRequest {
    #[serde(default = "default_lap_label")]
    pub label: String,
}

fn default_lap_label() -> String {
    "Lap".to_string()
}

/// Request body for PUT /timers/:name/laps/:index
#[derive(Debug, Deserialize)]
pub struct RenameLapRequest {
    pub label: String,
}

fn error_status(err: &StateError) -> StatusCode {
    match err {
        StateError::Registry(RegistryError::DuplicateName(_)) => StatusCode::CONFLICT,
        StateError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
        StateError::Timer(TimerError::IndexOutOfRange { .. }) => StatusCode::NOT_FOUND,
        StateError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handle POST /timers - Create a named timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTimerRequest>,
) -> Result<(StatusCode, Json<TimerResponse>), StatusCode> {
    match state.create_timer(&request.name) {
        Ok(timer) => Ok((
            StatusCode::CREATED,
            Json(TimerResponse::new(
                format!("Timer {:?} created", request.name),
                timer,
            )),
        )),
        Err(e) => {
            warn!("Failed to create timer {:?}: {}", request.name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle DELETE /timers/:name - Delete a timer and its records
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.delete_timer(&name) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            warn!("Failed to delete timer {:?}: {}", name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle GET /timers - List all timers in creation order
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, StatusCode> {
    match state.snapshots() {
        Ok(timers) => Ok(Json(ListResponse {
            count: timers.len(),
            timers,
        })),
        Err(e) => {
            warn!("Failed to list timers: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle GET /timers/:name - Full state of one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.timer_snapshot(&name) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            format!("Timer {name:?}"),
            timer,
        ))),
        Err(e) => Err(error_status(&e)),
    }
}

/// Handle POST /timers/:name/start - Start or resume a timer
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.start_timer(&name) {
        Ok((timer, started)) => {
            if started {
                spawn_ticker(&state, &name);
            }
            Ok(Json(TimerResponse::new(
                format!("Timer {name:?} running"),
                timer,
            )))
        }
        Err(e) => {
            warn!("Failed to start timer {:?}: {}", name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /timers/:name/pause - Pause a timer
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.pause_timer(&name) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            format!("Timer {name:?} paused"),
            timer,
        ))),
        Err(e) => {
            warn!("Failed to pause timer {:?}: {}", name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /timers/:name/reset - Reset a timer to idle
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.reset_timer(&name) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            format!("Timer {name:?} reset"),
            timer,
        ))),
        Err(e) => {
            warn!("Failed to reset timer {:?}: {}", name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /timers/:name/countdown - Toggle the pomodoro overlay
pub async fn countdown_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<CountdownRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    if request.target_minutes == 0 {
        warn!("Rejected zero-minute countdown on timer {:?}", name);
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.toggle_countdown(&name, request.target_minutes) {
        Ok((timer, started)) => {
            if started {
                spawn_ticker(&state, &name);
            }
            let message = if timer.countdown.is_some() {
                format!(
                    "Countdown of {} minute(s) set on timer {name:?}",
                    request.target_minutes
                )
            } else {
                format!("Countdown cleared on timer {name:?}")
            };
            Ok(Json(TimerResponse::new(message, timer)))
        }
        Err(e) => {
            warn!("Failed to toggle countdown on timer {:?}: {}", name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /timers/:name/laps - Record a lap at the current elapsed time
pub async fn add_lap_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<AddLapRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.add_lap(&name, &request.label) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            format!("Lap recorded on timer {name:?}"),
            timer,
        ))),
        Err(e) => {
            warn!("Failed to add lap on timer {:?}: {}", name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle PUT /timers/:name/laps/:index - Rename a lap
pub async fn rename_lap_handler(
    State(state): State<Arc<AppState>>,
    Path((name, index)): Path<(String, usize)>,
    Json(request): Json<RenameLapRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.rename_lap(&name, index, &request.label) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            format!("Lap {index} renamed on timer {name:?}"),
            timer,
        ))),
        Err(e) => {
            warn!("Failed to rename lap {} on timer {:?}: {}", index, name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle DELETE /timers/:name/laps/:index - Remove a lap
pub async fn delete_lap_handler(
    State(state): State<Arc<AppState>>,
    Path((name, index)): Path<(String, usize)>,
) -> Result<Json<TimerResponse>, StatusCode> {
    match state.delete_lap(&name, index) {
        Ok(timer) => Ok(Json(TimerResponse::new(
            format!("Lap {index} deleted on timer {name:?}"),
            timer,
        ))),
        Err(e) => {
            warn!("Failed to delete lap {} on timer {:?}: {}", index, name, e);
            Err(error_status(&e))
        }
    }
}

/// Handle GET /status - The spotlight display plus server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let spotlight = match state.spotlight_entry() {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Failed to read spotlight: {}", e);
            return Err(error_status(&e));
        }
    };
    let timer_count = state.timer_count().map_err(|e| error_status(&e))?;

    Ok(Json(StatusResponse::new(
        spotlight,
        timer_count,
        state.get_uptime(),
        state.port,
        state.host.clone(),
    )))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
