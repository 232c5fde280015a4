//! The countdown state machine.

use std::time::Duration;

use tenpercent_protocol::Precision;

/// What a single [`Countdown::tick`] produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownStep {
    /// Still running; this step's reading is throttled away.
    Quiet,
    /// Still running; publish this reading (seconds left).
    Tick(f64),
    /// Reached zero. The terminal `0` reading is always published.
    Expired,
}

/// Seconds remaining until a round resolves.
///
/// Readings are rounded to [`Precision::Timer`] after every step, so
/// repeated subtraction of `0.1` never shows up as `0.30000000000000004`.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: f64,
    remaining: f64,
    emit_every: u32,
    since_emit: u32,
}

impl Countdown {
    /// Starts a countdown of `seconds`, publishing every `emit_every`-th
    /// step (values below 1 are treated as 1).
    pub fn new(seconds: f64, emit_every: u32) -> Self {
        let start = if seconds.is_finite() {
            Precision::Timer.apply(seconds.max(0.0))
        } else {
            0.0
        };
        Self {
            duration: start,
            remaining: start,
            emit_every: emit_every.max(1),
            since_emit: 0,
        }
    }

    /// The duration this countdown was started with. Later changes to the
    /// room's timer setting do not touch it.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Current reading in seconds.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Whether the countdown has reached zero.
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Advances by `dt` of elapsed time.
    pub fn tick(&mut self, dt: Duration) -> CountdownStep {
        if self.is_expired() {
            return CountdownStep::Expired;
        }

        self.remaining = Precision::Timer.apply((self.remaining - dt.as_secs_f64()).max(0.0));
        if self.is_expired() {
            return CountdownStep::Expired;
        }

        self.since_emit += 1;
        if self.since_emit >= self.emit_every {
            self.since_emit = 0;
            CountdownStep::Tick(self.remaining)
        } else {
            CountdownStep::Quiet
        }
    }
}
