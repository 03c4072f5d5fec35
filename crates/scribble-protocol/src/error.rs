//! Error types for the protocol layer.
//!
//! Each crate in Scribble defines its own error enum. A `ProtocolError`
//! always means the bytes were wrong, never that the game rejected a move.

use crate::Action;

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes are not a message at all: not JSON, not an object, or no
    /// string `action` field. The connection is considered broken.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is well-formed but its `action` tag is not one we know.
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    /// The action is known but its payload has the wrong shape.
    #[error("malformed payload for {action}: {reason}")]
    MalformedPayload { action: Action, reason: String },

    /// The envelope is structurally wrong in a way serde didn't catch.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Whether the reader should give up on the connection.
    ///
    /// Unknown actions and bad payloads only cost the one message.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::UnknownAction(_) | Self::MalformedPayload { .. }
        )
    }
}
