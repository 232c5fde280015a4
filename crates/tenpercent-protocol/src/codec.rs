//! Codec trait and the JSON implementation.
//!
//! Browser clients speak JSON over WebSocket text frames, so a codec here
//! encodes to a `String` and decodes from raw frame bytes (text frames and
//! binary frames carrying UTF-8 JSON are both accepted).

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts protocol values to text frames and back.
///
/// `Send + Sync + 'static` so one codec can be shared by every
/// connection task through an `Arc`.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes frame bytes into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use tenpercent_protocol::{ClientIntent, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let intent: ClientIntent = codec
///     .decode(br#"{"event":"setBet","data":{"roomId":"lobby","bet":"7"}}"#)
///     .unwrap();
/// assert_eq!(intent.room_id(), &RoomId::from("lobby"));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
