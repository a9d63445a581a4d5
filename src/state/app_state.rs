//! Main application state management

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::services::Notifier;
use crate::storage::TimerStore;
use crate::utils::duration_text;

use super::registry::{RegistryError, TimerRegistry};
use super::spotlight::{SpotlightEntry, SpotlightState};
use super::timer::{TimerEngine, TimerError};

/// Errors surfaced by application state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error("state lock poisoned: {0}")]
    Lock(String),
}

/// Whether a tick was applied or the ticker task should stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Applied,
    Stopped,
}

/// Active countdown details for the display layer
#[derive(Debug, Clone, Serialize)]
pub struct CountdownView {
    pub target_minutes: u64,
    pub remaining_seconds: u64,
}

/// One lap with its derived segment duration
#[derive(Debug, Clone, Serialize)]
pub struct LapView {
    pub label: String,
    pub at_elapsed: u64,
    pub segment_seconds: u64,
    pub segment_text: String,
}

/// Full per-timer state for the display layer
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub name: String,
    pub elapsed_seconds: u64,
    pub duration_text: String,
    pub running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub countdown: Option<CountdownView>,
    pub laps: Vec<LapView>,
}

impl TimerSnapshot {
    fn of(engine: &TimerEngine) -> Self {
        let countdown = engine.countdown().map(|c| CountdownView {
            target_minutes: c.target_minutes,
            remaining_seconds: c.remaining(engine.elapsed_seconds()),
        });
        let laps = engine
            .laps()
            .iter()
            .enumerate()
            .map(|(i, lap)| {
                let segment = engine.lap_segment(i).unwrap_or(0);
                LapView {
                    label: lap.label.clone(),
                    at_elapsed: lap.at_elapsed,
                    segment_seconds: segment,
                    segment_text: duration_text(segment),
                }
            })
            .collect();
        Self {
            name: engine.name().to_string(),
            elapsed_seconds: engine.elapsed_seconds(),
            duration_text: duration_text(engine.elapsed_seconds()),
            running: engine.is_running(),
            started_at: engine.started_at(),
            countdown,
            laps,
        }
    }
}

/// Main application state: the timer registry, the spotlight slot, one ticker
/// task handle per running timer, the persistence adapter and the notifier
pub struct AppState {
    pub registry: Mutex<TimerRegistry>,
    pub spotlight: Mutex<SpotlightState>,
    tickers: Mutex<HashMap<String, JoinHandle<()>>>,
    pub store: TimerStore,
    pub notifier: Arc<dyn Notifier>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Channel for spotlight updates
    pub spotlight_tx: watch::Sender<Option<SpotlightEntry>>,
    /// Keep the receiver alive to prevent channel closure
    _spotlight_rx: watch::Receiver<Option<SpotlightEntry>>,
}

impl AppState {
    /// Build the application state, restoring every persisted timer. Restored
    /// timers come back paused.
    pub fn new(store: TimerStore, notifier: Arc<dyn Notifier>, port: u16, host: String) -> Self {
        let (spotlight_tx, spotlight_rx) = watch::channel(None);

        let names = store.load_names();
        let mut registry = TimerRegistry::new();
        for name in &names {
            registry.restore(store.load_timer(name));
        }
        if registry.names() != names.as_slice() {
            store.save_names(registry.names());
        }
        if !registry.is_empty() {
            info!("Restored {} timer(s) from the store", registry.len());
        }

        Self {
            registry: Mutex::new(registry),
            spotlight: Mutex::new(SpotlightState::new()),
            tickers: Mutex::new(HashMap::new()),
            store,
            notifier,
            start_time: Instant::now(),
            port,
            host,
            spotlight_tx,
            _spotlight_rx: spotlight_rx,
        }
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, TimerRegistry>, StateError> {
        self.registry
            .lock()
            .map_err(|e| StateError::Lock(e.to_string()))
    }

    /// Create a fresh idle timer under `name`
    pub fn create_timer(&self, name: &str) -> Result<TimerSnapshot, StateError> {
        let mut registry = self.lock_registry()?;
        let engine = registry.create(name)?;
        let snapshot = TimerSnapshot::of(engine);
        self.store.save_timer(engine);
        self.store.save_names(registry.names());
        info!("Created timer {:?}", name);
        Ok(snapshot)
    }

    /// Delete a timer, its ticker and every persisted record it owns
    pub fn delete_timer(&self, name: &str) -> Result<(), StateError> {
        self.cancel_ticker(name);
        let mut registry = self.lock_registry()?;
        registry.delete(name)?;
        self.store.remove_timer(name);
        self.store.save_names(registry.names());
        self.clear_spotlight(name);
        drop(registry);

        info!("Deleted timer {:?}", name);
        Ok(())
    }

    /// Start or resume a timer. The second tuple field tells the caller to
    /// spawn a ticker; it stays false on an idempotent re-start.
    pub fn start_timer(&self, name: &str) -> Result<(TimerSnapshot, bool), StateError> {
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        let started = engine.start(Utc::now());
        if started {
            self.store.save_timer(engine);
            info!("Started timer {:?}", name);
        }
        Ok((TimerSnapshot::of(engine), started))
    }

    /// Pause a timer, cancel its ticker and release the spotlight if held
    pub fn pause_timer(&self, name: &str) -> Result<TimerSnapshot, StateError> {
        self.cancel_ticker(name);
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        let paused = engine.pause();
        if paused {
            self.store.save_timer(engine);
        }
        let snapshot = TimerSnapshot::of(engine);
        // still holding the registry lock: tick() reports under the same
        // lock, so no in-flight tick can re-publish this timer afterwards
        if paused {
            self.clear_spotlight(name);
            info!("Paused timer {:?}", name);
        }
        Ok(snapshot)
    }

    /// Reset a timer to idle: elapsed, laps, countdown and start timestamp
    /// are cleared in one step and the timer is left paused
    pub fn reset_timer(&self, name: &str) -> Result<TimerSnapshot, StateError> {
        self.cancel_ticker(name);
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        engine.reset();
        self.store.save_timer(engine);
        let snapshot = TimerSnapshot::of(engine);
        self.clear_spotlight(name);
        info!("Reset timer {:?}", name);
        Ok(snapshot)
    }

    /// Toggle the countdown overlay on a timer. The second tuple field tells
    /// the caller to spawn a ticker when the toggle started a paused timer.
    pub fn toggle_countdown(
        &self,
        name: &str,
        target_minutes: u64,
    ) -> Result<(TimerSnapshot, bool), StateError> {
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        let toggle = engine.toggle_countdown(target_minutes, Utc::now());
        self.store.save_timer(engine);
        if toggle.active {
            info!(
                "Countdown of {} minute(s) set on timer {:?}",
                target_minutes, name
            );
        } else {
            info!("Countdown cleared on timer {:?}", name);
        }
        Ok((TimerSnapshot::of(engine), toggle.started))
    }

    /// Record a lap at the timer's current elapsed time
    pub fn add_lap(&self, name: &str, label: &str) -> Result<TimerSnapshot, StateError> {
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        if engine.add_lap(label) {
            self.store.save_timer(engine);
        } else {
            debug!("Ignored duplicate lap on timer {:?}", name);
        }
        Ok(TimerSnapshot::of(engine))
    }

    /// Rename the lap at `index`
    pub fn rename_lap(
        &self,
        name: &str,
        index: usize,
        label: &str,
    ) -> Result<TimerSnapshot, StateError> {
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        engine.rename_lap(index, label)?;
        self.store.save_timer(engine);
        Ok(TimerSnapshot::of(engine))
    }

    /// Remove the lap at `index`
    pub fn delete_lap(&self, name: &str, index: usize) -> Result<TimerSnapshot, StateError> {
        let mut registry = self.lock_registry()?;
        let engine = registry.engine_mut(name)?;
        engine.delete_lap(index)?;
        self.store.save_timer(engine);
        Ok(TimerSnapshot::of(engine))
    }

    /// Apply one tick to `name`. Called once per second from its ticker task;
    /// `Stopped` tells the task to exit, so a stray tick that raced a pause,
    /// reset or delete is dropped silently.
    pub fn tick(&self, name: &str) -> TickStatus {
        let Ok(mut registry) = self.registry.lock() else {
            return TickStatus::Stopped;
        };
        let Ok(engine) = registry.engine_mut(name) else {
            return TickStatus::Stopped;
        };
        let outcome = engine.tick();
        if !outcome.applied {
            return TickStatus::Stopped;
        }
        let elapsed = engine.elapsed_seconds();
        self.store.save_elapsed(name, elapsed);

        let report = SpotlightEntry {
            name: name.to_string(),
            elapsed_seconds: elapsed,
            countdown_remaining: outcome.countdown_remaining,
        };
        // spotlight updates always happen under the registry lock; stop
        // transitions clear it in the same critical section, so an applied
        // tick can never publish after its timer was stopped
        if let Ok(mut spotlight) = self.spotlight.lock() {
            let held = spotlight.report(report).clone();
            if let Err(e) = self.spotlight_tx.send(Some(held)) {
                warn!("Failed to send spotlight update: {}", e);
            }
        }
        drop(registry);

        if outcome.countdown_finished {
            info!("Countdown complete on timer {:?}", name);
            self.notifier.notify(
                "Countdown complete",
                &format!("Timer {name:?} finished its countdown"),
            );
        }
        TickStatus::Applied
    }

    /// Clear the spotlight if `name` holds it; the slot is never reassigned
    fn clear_spotlight(&self, name: &str) {
        if let Ok(mut spotlight) = self.spotlight.lock() {
            if spotlight.clear_for(name) {
                if let Err(e) = self.spotlight_tx.send(None) {
                    warn!("Failed to send spotlight update: {}", e);
                }
                debug!("Spotlight cleared after {:?} stopped", name);
            }
        }
    }

    /// Record the ticker task driving `name`, aborting any previous one
    pub fn register_ticker(&self, name: &str, handle: JoinHandle<()>) {
        if let Ok(mut tickers) = self.tickers.lock() {
            if let Some(old) = tickers.insert(name.to_string(), handle) {
                old.abort();
            }
        }
    }

    /// Synchronously cancel the ticker for `name`, if one is registered
    pub fn cancel_ticker(&self, name: &str) {
        if let Ok(mut tickers) = self.tickers.lock() {
            if let Some(handle) = tickers.remove(name) {
                handle.abort();
            }
        }
    }

    /// Snapshots of every timer, in creation order
    pub fn snapshots(&self) -> Result<Vec<TimerSnapshot>, StateError> {
        let registry = self.lock_registry()?;
        Ok(registry.engines().map(TimerSnapshot::of).collect())
    }

    /// Snapshot of a single timer
    pub fn timer_snapshot(&self, name: &str) -> Result<TimerSnapshot, StateError> {
        let registry = self.lock_registry()?;
        Ok(TimerSnapshot::of(registry.engine(name)?))
    }

    /// Current spotlight holder, if any
    pub fn spotlight_entry(&self) -> Result<Option<SpotlightEntry>, StateError> {
        self.spotlight
            .lock()
            .map(|spotlight| spotlight.current().cloned())
            .map_err(|e| StateError::Lock(e.to_string()))
    }

    pub fn timer_count(&self) -> Result<usize, StateError> {
        Ok(self.lock_registry()?.len())
    }

    /// Server uptime rendered with the same clock format as the timers
    pub fn get_uptime(&self) -> String {
        duration_text(self.start_time.elapsed().as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, summary: &str, body: &str) {
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(format!("{summary}: {body}"));
            }
        }
    }

    fn app_with(kv: Arc<MemoryStore>) -> (AppState, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(
            TimerStore::new(kv),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            0,
            "127.0.0.1".to_string(),
        );
        (state, notifier)
    }

    fn app() -> (AppState, Arc<RecordingNotifier>) {
        app_with(Arc::new(MemoryStore::new()))
    }

    fn ticks(state: &AppState, name: &str, n: u64) {
        for _ in 0..n {
            assert_eq!(state.tick(name), TickStatus::Applied);
        }
    }

    #[test]
    fn create_start_tick_lap_reset_end_to_end() {
        let (state, _) = app();
        state.create_timer("A").unwrap();

        let (_, spawn) = state.start_timer("A").unwrap();
        assert!(spawn);
        ticks(&state, "A", 3);

        let snapshot = state.timer_snapshot("A").unwrap();
        assert_eq!(snapshot.elapsed_seconds, 3);
        assert_eq!(snapshot.duration_text, "00:00:03");

        let snapshot = state.add_lap("A", "Lap").unwrap();
        assert_eq!(snapshot.laps.len(), 1);
        assert_eq!(snapshot.laps[0].label, "Lap");
        assert_eq!(snapshot.laps[0].at_elapsed, 3);

        let snapshot = state.reset_timer("A").unwrap();
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert!(snapshot.laps.is_empty());
        assert!(!snapshot.running);
        assert_eq!(state.tick("A"), TickStatus::Stopped);
    }

    #[test]
    fn idempotent_restart_does_not_ask_for_a_second_ticker() {
        let (state, _) = app();
        state.create_timer("A").unwrap();
        assert!(state.start_timer("A").unwrap().1);
        assert!(!state.start_timer("A").unwrap().1);
    }

    #[test]
    fn pausing_the_holder_clears_the_spotlight() {
        let (state, _) = app();
        state.create_timer("a").unwrap();
        state.create_timer("b").unwrap();
        state.start_timer("a").unwrap();
        state.start_timer("b").unwrap();

        ticks(&state, "a", 2);
        ticks(&state, "b", 1);
        assert_eq!(state.spotlight_entry().unwrap().unwrap().name, "a");

        state.pause_timer("a").unwrap();
        // not reassigned to the still-running timer until it reports again
        assert!(state.spotlight_entry().unwrap().is_none());

        state.tick("b");
        assert_eq!(state.spotlight_entry().unwrap().unwrap().name, "b");
    }

    #[test]
    fn pause_cannot_leave_a_stale_tick_in_the_spotlight() {
        let (state, _) = app();
        let state = Arc::new(state);
        state.create_timer("a").unwrap();
        state.start_timer("a").unwrap();

        // tick from another thread until the pause lands; a tick that
        // applied concurrently must never re-publish the paused timer
        let ticker = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || while state.tick("a") == TickStatus::Applied {})
        };
        state.pause_timer("a").unwrap();
        ticker.join().unwrap();

        assert!(state.spotlight_entry().unwrap().is_none());
    }

    #[test]
    fn countdown_report_takes_spotlight_from_longer_plain_timer() {
        let (state, _) = app();
        state.create_timer("plain").unwrap();
        state.create_timer("pomo").unwrap();
        state.start_timer("plain").unwrap();
        ticks(&state, "plain", 100);

        let (_, spawn) = state.toggle_countdown("pomo", 1).unwrap();
        assert!(spawn, "setting a countdown on a paused timer starts it");
        ticks(&state, "pomo", 5);
        let held = state.spotlight_entry().unwrap().unwrap();
        assert_eq!(held.name, "pomo");
        assert_eq!(held.countdown_remaining, Some(55));

        // plain reports keep coming but never displace the countdown
        ticks(&state, "plain", 1);
        assert_eq!(state.spotlight_entry().unwrap().unwrap().name, "pomo");
    }

    #[test]
    fn countdown_completion_notifies_and_keeps_the_timer_running() {
        let (state, notifier) = app();
        state.create_timer("pomo").unwrap();
        state.toggle_countdown("pomo", 1).unwrap();
        ticks(&state, "pomo", 60);

        let snapshot = state.timer_snapshot("pomo").unwrap();
        assert!(snapshot.countdown.is_none());
        assert!(snapshot.running);
        assert_eq!(snapshot.elapsed_seconds, 60);
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);

        // post-countdown reports are plain and refresh the slot
        ticks(&state, "pomo", 1);
        let held = state.spotlight_entry().unwrap().unwrap();
        assert_eq!(held.countdown_remaining, None);
        assert_eq!(held.elapsed_seconds, 61);
    }

    #[test]
    fn timers_are_restored_paused_from_the_store() {
        let kv = Arc::new(MemoryStore::new());
        {
            let (state, _) = app_with(Arc::clone(&kv));
            state.create_timer("work").unwrap();
            state.start_timer("work").unwrap();
            ticks(&state, "work", 4);
            state.add_lap("work", "first").unwrap();
        }

        let (state, _) = app_with(kv);
        let snapshots = state.snapshots().unwrap();
        assert_eq!(snapshots.len(), 1);
        let snapshot = &snapshots[0];
        assert_eq!(snapshot.name, "work");
        assert_eq!(snapshot.elapsed_seconds, 4);
        assert!(!snapshot.running);
        assert!(snapshot.started_at.is_some());
        assert_eq!(snapshot.laps.len(), 1);
    }

    #[test]
    fn delete_drops_registry_membership_and_records() {
        let kv = Arc::new(MemoryStore::new());
        let (state, _) = app_with(Arc::clone(&kv));
        state.create_timer("work").unwrap();
        state.start_timer("work").unwrap();
        ticks(&state, "work", 2);

        state.delete_timer("work").unwrap();
        assert!(matches!(
            state.delete_timer("work"),
            Err(StateError::Registry(RegistryError::NotFound(_)))
        ));
        assert_eq!(state.tick("work"), TickStatus::Stopped);
        assert!(state.spotlight_entry().unwrap().is_none());

        let (state, _) = app_with(kv);
        assert_eq!(state.timer_count().unwrap(), 0);
    }

    #[test]
    fn duplicate_create_is_refused_without_partial_state() {
        let (state, _) = app();
        state.create_timer("work").unwrap();
        assert!(matches!(
            state.create_timer("work"),
            Err(StateError::Registry(RegistryError::DuplicateName(_)))
        ));
        assert!(matches!(
            state.create_timer(""),
            Err(StateError::Registry(RegistryError::DuplicateName(_)))
        ));
        assert_eq!(state.timer_count().unwrap(), 1);
    }
}
