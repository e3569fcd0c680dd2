//! Codec trait and implementations for serializing events.
//!
//! The protocol is text-based, so a codec converts between Rust types
//! and UTF-8 frames. Keeping it behind a trait means a binary codec
//! could be dropped in later without touching the router or handler.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that encodes values to text frames and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or
    /// doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Human-readable and directly consumable by browser clients, which is
/// what the host and player front ends are.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, GamePin};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let event = ClientEvent::StartGame {
            pin: GamePin::new("314159"),
        };
        let text = codec.encode(&event).unwrap();
        let decoded: ClientEvent = codec.decode(&text).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode("not json");
        assert!(result.is_err());
    }
}
