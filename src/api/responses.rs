//! API response structures

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{SpotlightEntry, TimerSnapshot};
use crate::utils::duration_text;

/// Default page-level label shown while no timer holds the spotlight
const IDLE_TITLE: &str = "timestack";

/// API response for timer action endpoints
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    /// Create a response around a fresh snapshot; the status string mirrors
    /// the timer's run state
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: if timer.running { "running" } else { "paused" }.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response for the timer list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub count: usize,
    pub timers: Vec<TimerSnapshot>,
}

/// The spotlight holder rendered for the page-level display
#[derive(Debug, Clone, Serialize)]
pub struct SpotlightView {
    pub name: String,
    pub elapsed_seconds: u64,
    pub countdown_remaining: Option<u64>,
    pub title: String,
}

impl SpotlightView {
    pub fn of(entry: SpotlightEntry) -> Self {
        let title = match entry.countdown_remaining {
            Some(remaining) => format!("{} left - {}", duration_text(remaining), entry.name),
            None => format!("{} - {}", duration_text(entry.elapsed_seconds), entry.name),
        };
        Self {
            name: entry.name,
            elapsed_seconds: entry.elapsed_seconds,
            countdown_remaining: entry.countdown_remaining,
            title,
        }
    }
}

/// Status response: the shared spotlight display plus server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub spotlight: Option<SpotlightView>,
    pub title: String,
    pub timer_count: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

impl StatusResponse {
    pub fn new(
        spotlight: Option<SpotlightEntry>,
        timer_count: usize,
        uptime: String,
        port: u16,
        host: String,
    ) -> Self {
        let spotlight = spotlight.map(SpotlightView::of);
        let title = spotlight
            .as_ref()
            .map(|view| view.title.clone())
            .unwrap_or_else(|| IDLE_TITLE.to_string());
        Self {
            spotlight,
            title,
            timer_count,
            uptime,
            port,
            host,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: "1.0.0".to_string(),
        }
    }
}
