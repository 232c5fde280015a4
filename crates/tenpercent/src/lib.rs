//! # TenPercent
//!
//! Real-time multiplayer wagering rounds over WebSocket.
//!
//! Players join named rooms and declare a secret bet. While a room holds
//! at least two players a countdown runs; when it reaches zero one
//! player, picked uniformly at random, loses their bet, and it is split
//! among everyone else in proportion to their own bets. Then the next
//! round starts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tenpercent::prelude::*;
//!
//! # async fn start() -> Result<(), TenPercentError> {
//! let server = TenPercentServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::TenPercentError;
pub use server::{TenPercentServer, TenPercentServerBuilder};

pub use tenpercent_protocol as protocol;
pub use tenpercent_room as room;

/// The types most servers and tests need.
pub mod prelude {
    pub use crate::{ServerConfig, TenPercentError, TenPercentServer};
    pub use tenpercent_protocol::{ClientIntent, PlayerId, RoomId, ServerEvent};
    pub use tenpercent_room::{GameConfig, LoserSelector, UniformSelector};
}
