//! Error types for the protocol layer.

/// Errors that can occur while turning events into frames and back.
///
/// Malformed *values* inside a well-formed intent (a bet of `"abc"`, a
/// timer of `-3`) are not errors at this layer; they decode as invalid
/// numbers and the room engine substitutes defaults. Only frames that
/// cannot be read as an intent at all end up here.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not a known intent (bad JSON, unknown `event` name,
    /// missing `roomId`).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
