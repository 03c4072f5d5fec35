//! Unified error type for Scribble.

use scribble_protocol::ProtocolError;
use scribble_room::{RoomError, StoreError};
use scribble_session::SessionError;
use scribble_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `scribble` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unknown action).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unauthorized, already in a game).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (not found, full, banned, closed).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The durable room record backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
