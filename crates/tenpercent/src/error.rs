//! Unified error type for the TenPercent server.

use tenpercent_protocol::ProtocolError;
use tenpercent_room::RoomError;
use tenpercent_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TenPercentError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game actor is gone.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Socket address lookup and other OS-level failures.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
