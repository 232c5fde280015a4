//! Wire protocol for TenPercent.
//!
//! This crate defines what travels between a browser client and the
//! server:
//!
//! - **Intents** ([`ClientIntent`]): what a player asks the server to do
//!   (join a room, change their bet, rename, pick a round timer, leave).
//! - **Events** ([`ServerEvent`]): what the server pushes to room members
//!   (timer ticks, warnings, player snapshots, round results).
//! - **Numbers** ([`LooseNumber`], [`Precision`]): lenient decoding of
//!   numeric fields and the one rounding policy every layer applies.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how messages become text frames.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (ClientIntent / ServerEvent) → Room engine
//! ```
//!
//! The protocol layer knows nothing about connections or rooms beyond the
//! identifiers it carries.

mod codec;
mod error;
mod event;
mod intent;
mod numeric;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{AllowedTimers, PlayerView, PlayersSnapshot, RoundOutcome, RoundResult, ServerEvent};
pub use intent::{ClientIntent, LooseNumber, LooseText};
pub use numeric::{Precision, parse_float, round_to};
pub use types::{PlayerId, Recipient, RoomId};
