//! Round timer: the countdown half of a room.
//!
//! A room owns at most one [`Countdown`]. Starting while one is active is
//! a silent no-op; stopping is idempotent; expiry clears ownership before
//! the caller resolves the round, so the next `start` can't overlap it.

use std::time::Duration;

use tenpercent_tick::{Countdown, CountdownStep};

use crate::{GameConfig, Room};

impl Room {
    /// Starts a countdown from the room's current timer setting.
    ///
    /// Returns the initial reading to publish, or `None` if a countdown
    /// was already running.
    pub(crate) fn start_countdown(&mut self, config: &GameConfig) -> Option<f64> {
        if self.countdown.is_some() {
            return None;
        }
        let countdown = Countdown::new(self.round_timer_secs, config.tick_emit_every);
        let initial = countdown.remaining();
        self.countdown = Some(countdown);
        Some(initial)
    }

    /// Cancels the active countdown. Returns whether one was running.
    pub(crate) fn stop_countdown(&mut self) -> bool {
        self.countdown.take().is_some()
    }

    /// Advances the active countdown by `dt`.
    ///
    /// `None` when the room is paused. On [`CountdownStep::Expired`] the
    /// countdown has already been dropped.
    pub(crate) fn advance_countdown(&mut self, dt: Duration) -> Option<CountdownStep> {
        let step = self.countdown.as_mut()?.tick(dt);
        if step == CountdownStep::Expired {
            self.countdown = None;
        }
        Some(step)
    }
}
