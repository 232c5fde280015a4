//! Transport abstraction layer for TenPercent.
//!
//! The event gateway is written against two traits:
//!
//! - [`Transport`] hands out new connections.
//! - [`Connection`] exchanges text frames with one client.
//!
//! [`WebSocketTransport`] is the only implementation the server ships;
//! tests substitute in-memory connections.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique connection number, assigned at accept time.
///
/// The gateway turns it into the player's id, so one connection is one
/// player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that yields connected clients.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client. An `Err` affects only that client; the
    /// caller keeps accepting.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// One connected client.
///
/// `send_text` and `recv` take `&self` and may be awaited concurrently
/// (from two `select!` branches, say): outbound events keep flowing
/// while the gateway waits for the next inbound frame.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame.
    async fn send_text(&self, text: &str) -> Result<(), Self::Error>;

    /// Next data frame as raw bytes; text and binary frames both count.
    /// `Ok(None)` once the peer has closed the connection.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Starts a graceful close.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Remote address, when the transport has one.
    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}
