//! Per-timer state machine and lap ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from lap ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("lap index {index} is out of range (ledger has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A labeled split point on a timer's elapsed-time axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub label: String,
    pub at_elapsed: u64,
}

/// Active pomodoro overlay on a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub target_minutes: u64,
    pub baseline_elapsed: u64,
}

impl Countdown {
    /// Seconds left before the countdown expires at the given elapsed value.
    /// The target is only constrained to be positive, so the arithmetic
    /// saturates end to end.
    pub fn remaining(&self, elapsed_seconds: u64) -> u64 {
        let run = elapsed_seconds.saturating_sub(self.baseline_elapsed);
        self.target_minutes.saturating_mul(60).saturating_sub(run)
    }
}

/// Result of applying one tick to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// False when the tick arrived while paused and was dropped
    pub applied: bool,
    /// True when this tick drove an active countdown to zero
    pub countdown_finished: bool,
    /// Remaining countdown seconds after this tick, if one is still active
    pub countdown_remaining: Option<u64>,
}

impl TickOutcome {
    fn dropped() -> Self {
        Self {
            applied: false,
            countdown_finished: false,
            countdown_remaining: None,
        }
    }
}

/// Result of toggling the countdown overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownToggle {
    /// Whether an overlay is active after the toggle
    pub active: bool,
    /// Whether the toggle started a previously paused timer
    pub started: bool,
}

/// Per-timer state machine: elapsed seconds, pause state, countdown overlay
/// and lap ledger. Transitions are pure; persistence and side effects are
/// decided by the caller from the returned outcomes.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    name: String,
    elapsed_seconds: u64,
    running: bool,
    started_at: Option<DateTime<Utc>>,
    countdown: Option<Countdown>,
    laps: Vec<Lap>,
}

impl TimerEngine {
    /// Create a fresh idle timer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elapsed_seconds: 0,
            running: false,
            started_at: None,
            countdown: None,
            laps: Vec::new(),
        }
    }

    /// Rebuild a timer from persisted records. Restored timers come back
    /// paused and without a countdown overlay; neither is persisted.
    pub fn restore(
        name: impl Into<String>,
        elapsed_seconds: u64,
        started_at: Option<DateTime<Utc>>,
        laps: Vec<Lap>,
    ) -> Self {
        Self {
            name: name.into(),
            elapsed_seconds,
            running: false,
            started_at,
            countdown: None,
            laps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    /// Countdown seconds remaining, if an overlay is active
    pub fn countdown_remaining(&self) -> Option<u64> {
        self.countdown.map(|c| c.remaining(self.elapsed_seconds))
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    /// Start or resume the timer. Returns false if it was already running.
    /// Leaving zero elapsed stamps the start timestamp.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.running {
            return false;
        }
        if self.elapsed_seconds == 0 {
            self.started_at = Some(now);
        }
        self.running = true;
        true
    }

    /// Pause the timer. Returns false if it was already paused.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Apply one whole-second tick. A tick delivered while paused is dropped.
    /// Driving an active countdown to zero clears the overlay while the base
    /// timer keeps running.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::dropped();
        }
        self.elapsed_seconds += 1;
        match self.countdown {
            Some(countdown) => {
                let remaining = countdown.remaining(self.elapsed_seconds);
                if remaining == 0 {
                    self.countdown = None;
                    TickOutcome {
                        applied: true,
                        countdown_finished: true,
                        countdown_remaining: None,
                    }
                } else {
                    TickOutcome {
                        applied: true,
                        countdown_finished: false,
                        countdown_remaining: Some(remaining),
                    }
                }
            }
            None => TickOutcome {
                applied: true,
                countdown_finished: false,
                countdown_remaining: None,
            },
        }
    }

    /// Clear elapsed time, laps, countdown overlay and start timestamp in one
    /// step; leaves the timer paused. The timer's identity is untouched.
    pub fn reset(&mut self) {
        self.elapsed_seconds = 0;
        self.running = false;
        self.started_at = None;
        self.countdown = None;
        self.laps.clear();
    }

    /// Toggle the pomodoro overlay. Setting it baselines against the current
    /// elapsed value and starts the timer when paused; clearing it leaves the
    /// run state untouched. `target_minutes` must be greater than zero.
    pub fn toggle_countdown(&mut self, target_minutes: u64, now: DateTime<Utc>) -> CountdownToggle {
        if self.countdown.take().is_some() {
            return CountdownToggle {
                active: false,
                started: false,
            };
        }
        self.countdown = Some(Countdown {
            target_minutes,
            baseline_elapsed: self.elapsed_seconds,
        });
        let started = self.start(now);
        CountdownToggle {
            active: true,
            started,
        }
    }

    /// Append a lap at the current elapsed time. A second lap at the same
    /// instant is silently ignored. Returns whether an entry was appended.
    pub fn add_lap(&mut self, label: impl Into<String>) -> bool {
        if self
            .laps
            .last()
            .is_some_and(|lap| lap.at_elapsed == self.elapsed_seconds)
        {
            return false;
        }
        self.laps.push(Lap {
            label: label.into(),
            at_elapsed: self.elapsed_seconds,
        });
        true
    }

    /// Rename the lap at `index`
    pub fn rename_lap(&mut self, index: usize, label: impl Into<String>) -> Result<(), TimerError> {
        let len = self.laps.len();
        let lap = self
            .laps
            .get_mut(index)
            .ok_or(TimerError::IndexOutOfRange { index, len })?;
        lap.label = label.into();
        Ok(())
    }

    /// Remove the lap at `index`
    pub fn delete_lap(&mut self, index: usize) -> Result<Lap, TimerError> {
        if index >= self.laps.len() {
            return Err(TimerError::IndexOutOfRange {
                index,
                len: self.laps.len(),
            });
        }
        Ok(self.laps.remove(index))
    }

    /// Duration of lap segment `index`: time since the previous lap, or since
    /// zero for the first entry. Derived for display, never stored.
    pub fn lap_segment(&self, index: usize) -> Option<u64> {
        let lap = self.laps.get(index)?;
        let previous = if index == 0 {
            0
        } else {
            self.laps[index - 1].at_elapsed
        };
        Some(lap.at_elapsed.saturating_sub(previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(timer: &mut TimerEngine, n: u64) {
        for _ in 0..n {
            timer.tick();
        }
    }

    #[test]
    fn start_is_idempotent() {
        let mut timer = TimerEngine::new("work");
        assert!(timer.start(Utc::now()));
        let stamped = timer.started_at();
        assert!(!timer.start(Utc::now()));
        assert!(timer.is_running());
        assert_eq!(timer.started_at(), stamped);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut timer = TimerEngine::new("work");
        assert!(!timer.pause());
        timer.start(Utc::now());
        assert!(timer.pause());
        assert!(!timer.pause());
        assert!(!timer.is_running());
    }

    #[test]
    fn start_stamps_only_from_zero() {
        let mut timer = TimerEngine::new("work");
        timer.start(Utc::now());
        ticks(&mut timer, 2);
        let stamped = timer.started_at();
        timer.pause();
        timer.start(Utc::now());
        assert_eq!(timer.started_at(), stamped);
    }

    #[test]
    fn ticks_accumulate_only_while_running() {
        let mut timer = TimerEngine::new("work");
        assert!(!timer.tick().applied);
        assert_eq!(timer.elapsed_seconds(), 0);

        timer.start(Utc::now());
        ticks(&mut timer, 5);
        assert_eq!(timer.elapsed_seconds(), 5);

        timer.pause();
        assert!(!timer.tick().applied);
        assert_eq!(timer.elapsed_seconds(), 5);
    }

    #[test]
    fn reset_clears_everything_and_pauses() {
        let mut timer = TimerEngine::new("work");
        timer.start(Utc::now());
        ticks(&mut timer, 3);
        timer.add_lap("Lap");
        timer.toggle_countdown(1, Utc::now());

        timer.reset();
        assert_eq!(timer.elapsed_seconds(), 0);
        assert!(!timer.is_running());
        assert!(timer.started_at().is_none());
        assert!(timer.countdown().is_none());
        assert!(timer.laps().is_empty());
    }

    #[test]
    fn lap_at_same_instant_is_ignored() {
        let mut timer = TimerEngine::new("work");
        timer.start(Utc::now());
        ticks(&mut timer, 2);
        assert!(timer.add_lap("Lap"));
        assert!(!timer.add_lap("Lap"));
        assert_eq!(timer.laps().len(), 1);

        timer.tick();
        assert!(timer.add_lap("Lap"));
        assert_eq!(timer.laps().len(), 2);
    }

    #[test]
    fn lap_segments_are_relative_to_previous_lap() {
        let mut timer = TimerEngine::new("work");
        timer.start(Utc::now());
        ticks(&mut timer, 3);
        timer.add_lap("first");
        ticks(&mut timer, 4);
        timer.add_lap("second");

        assert_eq!(timer.lap_segment(0), Some(3));
        assert_eq!(timer.lap_segment(1), Some(4));
        assert_eq!(timer.lap_segment(2), None);
    }

    #[test]
    fn lap_index_errors_are_rejected() {
        let mut timer = TimerEngine::new("work");
        timer.add_lap("only");
        assert_eq!(
            timer.rename_lap(1, "renamed"),
            Err(TimerError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert!(timer.delete_lap(3).is_err());
        assert_eq!(timer.laps().len(), 1);

        assert!(timer.rename_lap(0, "renamed").is_ok());
        assert_eq!(timer.laps()[0].label, "renamed");
        assert!(timer.delete_lap(0).is_ok());
        assert!(timer.delete_lap(0).is_err());
    }

    #[test]
    fn countdown_toggle_starts_a_paused_timer() {
        let mut timer = TimerEngine::new("work");
        let toggle = timer.toggle_countdown(25, Utc::now());
        assert!(toggle.active);
        assert!(toggle.started);
        assert!(timer.is_running());
        assert_eq!(timer.countdown_remaining(), Some(25 * 60));

        let toggle = timer.toggle_countdown(25, Utc::now());
        assert!(!toggle.active);
        assert!(!toggle.started);
        assert!(timer.is_running());
        assert!(timer.countdown().is_none());
    }

    #[test]
    fn countdown_baselines_against_current_elapsed() {
        let mut timer = TimerEngine::new("work");
        timer.start(Utc::now());
        ticks(&mut timer, 40);
        timer.toggle_countdown(1, Utc::now());

        let outcome = timer.tick();
        assert_eq!(outcome.countdown_remaining, Some(59));
    }

    #[test]
    fn countdown_expiry_clears_overlay_and_keeps_running() {
        let mut timer = TimerEngine::new("work");
        timer.toggle_countdown(1, Utc::now());

        ticks(&mut timer, 59);
        assert_eq!(timer.countdown_remaining(), Some(1));

        let outcome = timer.tick();
        assert!(outcome.countdown_finished);
        assert_eq!(outcome.countdown_remaining, None);
        assert!(timer.countdown().is_none());
        assert!(timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 60);

        // the base timer keeps ticking past the expiry
        let outcome = timer.tick();
        assert!(outcome.applied);
        assert!(!outcome.countdown_finished);
    }

    #[test]
    fn absurd_countdown_targets_saturate_instead_of_overflowing() {
        let mut timer = TimerEngine::new("work");
        timer.toggle_countdown(u64::MAX, Utc::now());
        assert_eq!(timer.countdown_remaining(), Some(u64::MAX));

        let outcome = timer.tick();
        assert!(!outcome.countdown_finished);
        assert_eq!(outcome.countdown_remaining, Some(u64::MAX - 1));
    }

    #[test]
    fn clearing_countdown_does_not_alter_elapsed() {
        let mut timer = TimerEngine::new("work");
        timer.start(Utc::now());
        ticks(&mut timer, 10);
        timer.toggle_countdown(5, Utc::now());
        ticks(&mut timer, 3);
        timer.toggle_countdown(5, Utc::now());
        assert_eq!(timer.elapsed_seconds(), 13);
        assert!(timer.countdown().is_none());
    }

    #[test]
    fn restore_comes_back_paused() {
        let timer = TimerEngine::restore(
            "work",
            42,
            None,
            vec![Lap {
                label: "Lap".to_string(),
                at_elapsed: 10,
            }],
        );
        assert_eq!(timer.elapsed_seconds(), 42);
        assert!(!timer.is_running());
        assert!(timer.countdown().is_none());
        assert_eq!(timer.laps().len(), 1);
    }
}
