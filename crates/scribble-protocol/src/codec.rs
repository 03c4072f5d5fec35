//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust values and raw bytes.
//! The rest of the workspace only talks to the [`Codec`] trait, so the
//! wire format can change without touching the game engine.

use serde::{de::DeserializeOwned, Serialize};

use crate::{Message, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// - `Send + Sync` → one codec value is shared by every pump task.
/// - `'static` → it lives as long as the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes one game message, distinguishing the three ways it can fail:
    ///
    /// - not a message at all → a fatal decode error
    /// - unknown `action` → [`ProtocolError::UnknownAction`]
    /// - known action, wrong payload → [`ProtocolError::MalformedPayload`]
    fn decode_message(&self, data: &[u8]) -> Result<Message, ProtocolError>;

    /// Encodes one game message. Never fails for well-typed values with a
    /// self-describing format, but the signature stays honest.
    fn encode_message(&self, msg: &Message) -> Result<Vec<u8>, ProtocolError> {
        self.encode(msg)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON is what the browser client speaks, and it keeps messages readable
/// in DevTools. Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use scribble_protocol::{Codec, JsonCodec, Message};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode_message(&Message::Guess("cat".into())).unwrap();
/// assert_eq!(bytes, br#"{"action":"guess","payload":"cat"}"#);
///
/// let decoded = codec.decode_message(&bytes).unwrap();
/// assert_eq!(decoded, Message::Guess("cat".into()));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn decode_message(&self, data: &[u8]) -> Result<Message, ProtocolError> {
        use serde_json::Value;

        // Two stages: find the tag ourselves, then let serde check the
        // payload against the variant the tag names.
        let value: Value = self.decode(data)?;
        let tag = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProtocolError::InvalidMessage("missing string field `action`".into())
            })?;
        let action: crate::Action = tag.parse()?;

        serde_json::from_value(value).map_err(|e| ProtocolError::MalformedPayload {
            action,
            reason: e.to_string(),
        })
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Action, ChatLine, Phase, Pick, PlayerEntry, PlayerId, Point, Segment, Snapshot};

    fn decode(raw: &str) -> Result<Message, ProtocolError> {
        JsonCodec.decode_message(raw.as_bytes())
    }

    #[test]
    fn test_round_trip_preserves_payloads() {
        let snapshot = Snapshot {
            phase: Phase::Drawing,
            owner: PlayerId(1),
            drawer: Some(PlayerId(2)),
            players: vec![
                PlayerEntry { id: PlayerId(1), name: "ada".into(), score: 12 },
                PlayerEntry { id: PlayerId(2), name: "bob".into(), score: 3 },
            ],
            board: vec![
                Message::ChangeColor("#00ff00".into()),
                Message::Line(Segment {
                    start: Point { x: -4, y: 10 },
                    end: Point { x: 40, y: 12 },
                }),
            ],
        };
        let cases = [
            Message::Greet(snapshot),
            Message::Pick(Pick::Offer(["cat".into(), "dog".into()])),
            Message::Chat(ChatLine { from: Some(PlayerId(5)), text: "hey".into() }),
            Message::Draw(vec![1, 2, 3, 4]),
            Message::Starting(PlayerId(9)),
            Message::ClearBoard,
        ];
        for msg in cases {
            let bytes = JsonCodec.encode_message(&msg).unwrap();
            assert_eq!(JsonCodec.decode_message(&bytes).unwrap(), msg);
        }
    }

    #[test]
    fn test_unknown_action() {
        let err = decode(r#"{"action":"teleport","payload":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownAction(ref t) if t == "teleport"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_payload_of_wrong_shape_is_malformed() {
        let err = decode(r#"{"action":"guess","payload":{"x":1}}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedPayload { action: Action::Guess, .. }
        ));
        assert!(!err.is_fatal());

        let err = decode(r#"{"action":"line","payload":[1,2]}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedPayload { action: Action::Line, .. }
        ));
    }

    #[test]
    fn test_missing_payload_is_malformed() {
        let err = decode(r#"{"action":"change-pencil-size"}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedPayload { action: Action::ChangePencilSize, .. }
        ));
    }

    #[test]
    fn test_negative_size_is_malformed() {
        let err = decode(r#"{"action":"change-eraser-size","payload":-3}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedPayload { .. }));
    }

    #[test]
    fn test_garbage_is_fatal() {
        let err = decode("not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
        assert!(err.is_fatal());

        let err = decode(r#"{"payload":"cat"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_client_messages_decode() {
        assert_eq!(decode(r#"{"action":"start"}"#).unwrap(), Message::Start);
        assert_eq!(
            decode(r#"{"action":"chat","payload":{"text":"hi"}}"#).unwrap(),
            Message::Chat(ChatLine::new("hi"))
        );
        assert_eq!(
            decode(r#"{"action":"kick","payload":4}"#).unwrap(),
            Message::Kick(PlayerId(4))
        );
    }
}
