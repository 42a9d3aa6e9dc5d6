//! Debounce gate for button presses

use std::time::{Duration, Instant};

/// Collapses bursts of triggers into one accepted press.
///
/// A trigger is accepted when at least `interval` has passed since the last
/// accepted one. The baseline starts at process start so stale traffic right
/// after launch does not fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last_accepted: Instant,
}

impl Debouncer {
    pub fn new(interval: Duration, baseline: Instant) -> Self {
        Self {
            interval,
            last_accepted: baseline,
        }
    }

    /// Accepts and records `at`, or suppresses it leaving state untouched
    pub fn accept(&mut self, at: Instant) -> bool {
        if at.saturating_duration_since(self.last_accepted) >= self.interval {
            self.last_accepted = at;
            true
        } else {
            false
        }
    }

    pub fn last_accepted(&self) -> Instant {
        self.last_accepted
    }
}
