//! Inbound intents and the lenient value types they carry.
//!
//! The browser client is loosely typed: a bet may arrive as `7`, `"7"`,
//! `"7 coins"`, `null` or `true`. Rather than rejecting the whole frame,
//! numeric fields decode into [`LooseNumber`], which records "no usable
//! number" as `None`. The room engine then clamps or substitutes defaults,
//! so a malformed value is reflected in state, never surfaced as an error.

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{RoomId, parse_float};

// ---------------------------------------------------------------------------
// LooseNumber
// ---------------------------------------------------------------------------

/// A numeric field decoded the way `parseFloat` would read it.
///
/// `None` means "not a number" (missing, `null`, boolean, object, or a
/// string without a numeric prefix). `Some` may still hold a non-finite
/// value (`"Infinity"`, `1e400`); consumers check `is_finite`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LooseNumber(pub Option<f64>);

impl LooseNumber {
    /// The value if it is a finite number.
    pub fn finite(self) -> Option<f64> {
        self.0.filter(|v| v.is_finite())
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        Self(Some(value))
    }
}

impl Serialize for LooseNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LooseNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LooseNumberVisitor)
    }
}

struct LooseNumberVisitor;

impl<'de> Visitor<'de> for LooseNumberVisitor {
    type Value = LooseNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<LooseNumber, E> {
        Ok(LooseNumber(None))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LooseNumber, E> {
        Ok(LooseNumber(Some(v as f64)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LooseNumber, E> {
        Ok(LooseNumber(Some(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LooseNumber, E> {
        Ok(LooseNumber(Some(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LooseNumber, E> {
        Ok(LooseNumber(parse_float(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<LooseNumber, E> {
        Ok(LooseNumber(None))
    }

    fn visit_none<E: de::Error>(self) -> Result<LooseNumber, E> {
        Ok(LooseNumber(None))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<LooseNumber, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LooseNumber, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LooseNumber(None))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LooseNumber, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(LooseNumber(None))
    }
}

// ---------------------------------------------------------------------------
// LooseText
// ---------------------------------------------------------------------------

/// A text field that also accepts numbers and booleans (`42` → `"42"`).
///
/// `None` for missing, `null`, arrays and objects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LooseText(pub Option<String>);

impl LooseText {
    /// The text if present and non-empty.
    pub fn non_empty(&self) -> Option<&str> {
        self.0.as_deref().filter(|s| !s.is_empty())
    }
}

impl From<&str> for LooseText {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl Serialize for LooseText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LooseText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LooseTextVisitor)
    }
}

struct LooseTextVisitor;

impl<'de> Visitor<'de> for LooseTextVisitor {
    type Value = LooseText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<LooseText, E> {
        Ok(LooseText(Some(v.to_string())))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LooseText, E> {
        Ok(LooseText(Some(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LooseText, E> {
        Ok(LooseText(Some(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LooseText, E> {
        Ok(LooseText(Some(v.to_string())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LooseText, E> {
        Ok(LooseText(Some(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<LooseText, E> {
        Ok(LooseText(Some(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<LooseText, E> {
        Ok(LooseText(None))
    }

    fn visit_none<E: de::Error>(self) -> Result<LooseText, E> {
        Ok(LooseText(None))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<LooseText, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LooseText, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LooseText(None))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LooseText, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(LooseText(None))
    }
}

// ---------------------------------------------------------------------------
// ClientIntent
// ---------------------------------------------------------------------------

/// Everything a player can ask of the server.
///
/// Wire shape is `{"event": "<name>", "data": {...}}` with camelCase
/// field names. Disconnect is not an intent: the gateway derives it from
/// the socket closing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientIntent {
    /// Enter a room, creating it if needed. Re-joining replaces the
    /// player's seat (balance back to zero).
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        name: LooseText,
        #[serde(default)]
        starting_bet: LooseNumber,
    },

    /// Change the persistent declared bet. Never broadcast.
    #[serde(rename_all = "camelCase")]
    SetBet {
        room_id: RoomId,
        #[serde(default)]
        bet: LooseNumber,
    },

    /// Change the display name.
    #[serde(rename_all = "camelCase")]
    SetName {
        room_id: RoomId,
        #[serde(default)]
        name: LooseText,
    },

    /// Pick a round duration (seconds) from the allowed set.
    #[serde(rename_all = "camelCase")]
    SetTimer {
        room_id: RoomId,
        #[serde(default)]
        timer: LooseNumber,
    },

    /// Leave one room without closing the connection.
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: RoomId },
}

impl ClientIntent {
    /// The room the intent targets.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::SetBet { room_id, .. }
            | Self::SetName { room_id, .. }
            | Self::SetTimer { room_id, .. }
            | Self::LeaveRoom { room_id } => room_id,
        }
    }

    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "joinRoom",
            Self::SetBet { .. } => "setBet",
            Self::SetName { .. } => "setName",
            Self::SetTimer { .. } => "setTimer",
            Self::LeaveRoom { .. } => "leaveRoom",
        }
    }
}
