//! Rooms and the round engine for TenPercent.
//!
//! Every room runs the same loop: while at least two players are seated
//! a countdown runs, and when it hits zero one player, picked uniformly
//! at random, loses their bet to everyone else in proportion to their
//! own bets. Then the next countdown starts.
//!
//! # Key types
//!
//! - [`Lobby`]: the lifecycle controller; intents and elapsed time in,
//!   [`Dispatch`]es out
//! - [`RoomRegistry`] / [`Room`] / [`Player`]: the state it owns
//! - [`settle`]: the pure payout math
//! - [`LoserSelector`]: injected randomness ([`UniformSelector`] in
//!   production)
//! - [`spawn_game`] / [`GameHandle`]: the actor that serves a server's
//!   connections and drives countdowns in real time
//! - [`GameConfig`]: bets, timers, names, cadence

mod actor;
mod config;
mod error;
mod lobby;
mod model;
mod registry;
mod resolver;
mod timer;

pub use actor::{GameHandle, PlayerSender, RoomInfo, spawn_game};
pub use config::{GameConfig, RoomPhase};
pub use error::RoomError;
pub use lobby::{Dispatch, Lobby, WARN_CANNOT_RUN};
pub use model::{Player, Room};
pub use registry::RoomRegistry;
pub use resolver::{LoserSelector, Settlement, UniformSelector, settle};
