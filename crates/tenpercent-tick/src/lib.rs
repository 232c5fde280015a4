//! Round countdowns for TenPercent.
//!
//! Two pieces, kept apart so the timing rules can be tested without a
//! clock:
//!
//! - [`Countdown`]: a pure state machine. `tick(dt)` subtracts elapsed
//!   time, clamps at zero, rounds the reading, and says whether to publish
//!   it or whether the countdown just expired.
//! - [`TickScheduler`]: the driver. It fires on a fixed cadence (100 ms by
//!   default), anchored at the moment it was created, and reports how much
//!   time each firing stands for.
//!
//! # Integration
//!
//! Each counting-down room gets its own scheduler in a small ticker task,
//! so every countdown keeps the cadence it started with:
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(TickConfig::default());
//! loop {
//!     let info = scheduler.wait_for_tick().await;
//!     if ticks.send((room_id.clone(), info.elapsed())).is_err() {
//!         break;
//!     }
//! }
//! ```

mod countdown;
mod scheduler;

pub use countdown::{Countdown, CountdownStep};
pub use scheduler::{TickConfig, TickInfo, TickScheduler};
