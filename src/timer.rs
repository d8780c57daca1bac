//! Per-session turn clock.
//!
//! Each registry entry owns one `TurnTimer`; there is no separate timer
//! map to fall out of sync with the session's lifecycle. The timer never
//! reads the clock itself: the driver passes `Instant`s into `expired` and
//! `reset`, so polling cadence is entirely the driver's business.
//!
//! Expiry is level-triggered, not edge-triggered: `expired` keeps
//! answering `true` until the timer is reset, and the session's
//! already-passed / not-your-turn guards make a double-applied auto-pass a
//! no-op. Irregular polling is therefore safe.

use std::time::{Duration, Instant};

/// Countdown for the current turn of one session.
#[derive(Clone, Copy, Debug)]
pub struct TurnTimer {
    turn_started: Instant,
    budget: Duration,
}

impl TurnTimer {
    /// Start a timer with the given per-turn budget.
    #[must_use]
    pub fn new(now: Instant, budget: Duration) -> Self {
        Self {
            turn_started: now,
            budget,
        }
    }

    /// Re-arm for the next turn.
    pub fn reset(&mut self, now: Instant) {
        self.turn_started = now;
    }

    /// When the current turn's clock started.
    #[must_use]
    pub fn started(&self) -> Instant {
        self.turn_started
    }

    /// Has the current turn's budget elapsed?
    #[must_use]
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.turn_started) > self.budget
    }

    /// Time left before auto-pass; zero once expired.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.budget
            .saturating_sub(now.duration_since(self.turn_started))
    }

    /// The configured per-turn budget.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }
}
