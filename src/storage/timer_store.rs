//! Timer record schema over the key-value store
//!
//! One logical record set per timer name: elapsed seconds as base-10 text,
//! the start timestamp as RFC 3339 text, and the lap ledger as a JSON list.
//! The registry's ordered name list is a JSON list under its own key.
//! Malformed fields never abort a load; each falls back to its default.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::state::timer::{Lap, TimerEngine};
use super::KeyValueStore;

const REGISTRY_KEY: &str = "timestack-timers";
const TIMER_KEY_PREFIX: &str = "timestack-timer-";

fn elapsed_key(name: &str) -> String {
    format!("{TIMER_KEY_PREFIX}{name}")
}

fn started_key(name: &str) -> String {
    format!("{TIMER_KEY_PREFIX}{name}-started")
}

fn laps_key(name: &str) -> String {
    format!("{TIMER_KEY_PREFIX}{name}-laps")
}

/// Snapshot adapter between timer engines and the key-value store. Engines
/// stay free of I/O; the hosting state calls this after each transition.
#[derive(Clone)]
pub struct TimerStore {
    inner: Arc<dyn KeyValueStore>,
}

impl TimerStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Load the registry's ordered name list
    pub fn load_names(&self) -> Vec<String> {
        let Some(text) = self.inner.get(REGISTRY_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&text) {
            Ok(names) => names,
            Err(e) => {
                warn!("Ignoring malformed timer name list: {}", e);
                Vec::new()
            }
        }
    }

    /// Persist the registry's ordered name list
    pub fn save_names(&self, names: &[String]) {
        match serde_json::to_string(names) {
            Ok(text) => self.inner.set(REGISTRY_KEY, &text),
            Err(e) => warn!("Failed to serialize timer name list: {}", e),
        }
    }

    /// Rebuild a paused engine from the records under `name`, falling back
    /// field by field: unparseable elapsed reads as 0, an invalid timestamp
    /// as none, a malformed lap list as empty.
    pub fn load_timer(&self, name: &str) -> TimerEngine {
        let elapsed = match self.inner.get(&elapsed_key(name)) {
            Some(text) => text.parse::<u64>().unwrap_or_else(|e| {
                warn!("Ignoring malformed elapsed time for {:?}: {}", name, e);
                0
            }),
            None => 0,
        };

        let started_at = self.inner.get(&started_key(name)).and_then(|text| {
            match DateTime::parse_from_rfc3339(&text) {
                Ok(stamp) => Some(stamp.with_timezone(&Utc)),
                Err(e) => {
                    warn!("Ignoring malformed start timestamp for {:?}: {}", name, e);
                    None
                }
            }
        });

        let laps: Vec<Lap> = match self.inner.get(&laps_key(name)) {
            Some(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed lap ledger for {:?}: {}", name, e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        TimerEngine::restore(name, elapsed, started_at, laps)
    }

    /// Snapshot the full record set for one engine
    pub fn save_timer(&self, engine: &TimerEngine) {
        self.save_elapsed(engine.name(), engine.elapsed_seconds());

        match engine.started_at() {
            Some(stamp) => self
                .inner
                .set(&started_key(engine.name()), &stamp.to_rfc3339()),
            None => self.inner.remove(&started_key(engine.name())),
        }

        match serde_json::to_string(engine.laps()) {
            Ok(text) => self.inner.set(&laps_key(engine.name()), &text),
            Err(e) => warn!("Failed to serialize laps for {:?}: {}", engine.name(), e),
        }
    }

    /// Persist only the elapsed counter; the per-second hot path
    pub fn save_elapsed(&self, name: &str, elapsed_seconds: u64) {
        self.inner
            .set(&elapsed_key(name), &elapsed_seconds.to_string());
    }

    /// Drop every record under `name`
    pub fn remove_timer(&self, name: &str) {
        self.inner.remove(&elapsed_key(name));
        self.inner.remove(&started_key(name));
        self.inner.remove(&laps_key(name));
    }
}
