//! Error types for the room layer.
//!
//! Most bad input never becomes an error here: malformed bets, names and
//! timers are clamped or defaulted, and intents for unknown rooms or
//! players are ignored. What remains is the resolver's precondition and
//! the actor channel going away.

use tenpercent_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A round was asked to resolve with too few players.
    #[error("room {room_id} has {have} player(s), a round needs {required}")]
    InsufficientPlayers {
        room_id: RoomId,
        have: usize,
        required: usize,
    },

    /// An internal contract was broken (e.g. a selector picked an index
    /// outside the candidate list).
    #[error("invalid room state: {0}")]
    InvalidState(String),

    /// The game actor's command channel is closed.
    #[error("game actor is unavailable")]
    Unavailable,
}
