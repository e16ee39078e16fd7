//! Dashboard clock — tick counter plus the wall-clock sources it reads.

use crate::types::Tick;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashClock {
    pub current_tick: Tick,
    /// Instant the last tick rendered, if any.
    pub last_instant: Option<DateTime<Utc>>,
}

impl DashClock {
    pub fn new() -> Self { Self::default() }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Tick {
        self.current_tick += 1;
        self.last_instant = Some(now);
        self.current_tick
    }
}

/// Where "now" comes from. The only input the dashboard reads.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

/// The host's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub DateTime<Utc>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> { self.0 }
}

/// Starts at `start` and moves forward by `step` on every read.
/// Used for fast-forward runs and tests that walk across boundaries.
#[derive(Debug)]
pub struct SteppingTimeSource {
    next: Cell<DateTime<Utc>>,
    step: Duration,
}

impl SteppingTimeSource {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self { next: Cell::new(start), step }
    }
}

impl TimeSource for SteppingTimeSource {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}
