//! Outbound events and the player snapshot they carry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomId};

/// One player's result for the most recently resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    /// `false` for the round's loser.
    pub win: bool,
    /// Balance change: `-bet` for the loser, the proportional share for
    /// everyone else.
    pub delta: f64,
    /// The bet snapshotted when the round resolved.
    pub last_bet: f64,
    /// Mean of every other player's bet that round.
    pub avg_others: f64,
}

/// The public view of a player. The declared bet is deliberately absent:
/// bets stay secret until a round reveals them through `lastResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub balance: f64,
    pub last_result: Option<RoundOutcome>,
}

/// Every player in a room, keyed by id.
pub type PlayersSnapshot = BTreeMap<PlayerId, PlayerView>;

/// Payload of the `roundResult` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub room_id: RoomId,
    /// 1 for a room's first resolved round.
    pub round_index: u64,
    pub loser: PlayerId,
    pub players: PlayersSnapshot,
}

/// Payload of the `allowedTimers` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedTimers {
    /// Every accepted round duration, in seconds.
    pub options: Vec<f64>,
    /// The room's current round duration.
    pub current: f64,
}

/// Everything the server pushes to clients.
///
/// Same `{"event", "data"}` framing as [`ClientIntent`](crate::ClientIntent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Seconds left in the current countdown.
    Timer(f64),
    /// Room-wide notice. An empty string clears it.
    Warning(String),
    /// Full player snapshot after a membership or name change.
    PlayersUpdate(PlayersSnapshot),
    /// A round just resolved.
    RoundResult(RoundResult),
    /// Timer choices and the room's current value.
    AllowedTimers(AllowedTimers),
}

impl ServerEvent {
    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timer(_) => "timer",
            Self::Warning(_) => "warning",
            Self::PlayersUpdate(_) => "playersUpdate",
            Self::RoundResult(_) => "roundResult",
            Self::AllowedTimers(_) => "allowedTimers",
        }
    }
}
