//! Error types for the session layer.

use scribble_protocol::{PlayerId, RoomId};

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credential was missing, invalid, or rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The player is already seated in a game. A player can only be in
    /// one game at a time.
    #[error("player {0} is already in game {1}")]
    AlreadyInGame(PlayerId, RoomId),
}
