//! Identity types shared by every layer.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::LooseText;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one connected player.
///
/// The gateway derives it from the connection id, so a player id lives
/// exactly as long as its socket. Serializes as a plain number; as a map
/// key (player snapshots) it becomes the number's string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifies a room. Chosen by the client, opaque to the server.
///
/// Decoding is lenient: `"lobby"` and `42` are both accepted (the latter
/// becomes `"42"`), matching the loosely typed browser client. `null`,
/// objects and arrays are rejected, which makes the whole intent
/// undecodable and therefore a no-op.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id never names a room.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match LooseText::deserialize(deserializer)?.0 {
            Some(text) => Ok(Self(text)),
            None => Err(serde::de::Error::custom("room id must be text or a number")),
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a room should receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every member of the room.
    All,
    /// One player only (replies such as a rejected timer change).
    Player(PlayerId),
}
