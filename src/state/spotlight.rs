//! Cross-timer spotlight arbitration
//!
//! Every running timer reports `(name, elapsed, countdown remaining)` once per
//! second; the arbiter picks the single timer whose time drives the shared
//! page-title display.

use serde::Serialize;

/// One tick report, also the value held in the spotlight slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotlightEntry {
    pub name: String,
    pub elapsed_seconds: u64,
    pub countdown_remaining: Option<u64>,
}

/// Decide which entry owns the spotlight after a new tick report.
///
/// Precedence, evaluated per report:
/// 1. An empty slot is claimed unconditionally.
/// 2. A report from the current holder refreshes the slot, so a holder whose
///    countdown just cleared is re-ranked as a plain timer from then on.
/// 3. Between different timers: an active countdown is never displaced by a
///    plain timer, a countdown always takes the slot from a plain timer,
///    between two countdowns the smaller remaining wins, and between two
///    plain timers the larger elapsed wins. Ties keep the incumbent.
pub fn arbitrate(current: Option<SpotlightEntry>, report: SpotlightEntry) -> SpotlightEntry {
    let current = match current {
        None => return report,
        Some(current) if current.name == report.name => return report,
        Some(current) => current,
    };

    match (current.countdown_remaining, report.countdown_remaining) {
        (Some(_), None) => current,
        (None, Some(_)) => report,
        (Some(held), Some(incoming)) => {
            if incoming < held {
                report
            } else {
                current
            }
        }
        (None, None) => {
            if report.elapsed_seconds > current.elapsed_seconds {
                report
            } else {
                current
            }
        }
    }
}

/// Process-scoped spotlight slot; never persisted
#[derive(Debug, Default)]
pub struct SpotlightState {
    current: Option<SpotlightEntry>,
}

impl SpotlightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SpotlightEntry> {
        self.current.as_ref()
    }

    /// Feed one tick report through the arbitration policy. Returns the
    /// entry holding the slot afterwards.
    pub fn report(&mut self, report: SpotlightEntry) -> &SpotlightEntry {
        let next = arbitrate(self.current.take(), report);
        self.current.insert(next)
    }

    /// Clear the slot if `name` holds it. Pausing, resetting or deleting the
    /// holder empties the display; it is never reassigned automatically.
    /// Returns whether the slot was cleared.
    pub fn clear_for(&mut self, name: &str) -> bool {
        if self.current.as_ref().is_some_and(|entry| entry.name == name) {
            self.current = None;
            return true;
        }
        false
    }
}
