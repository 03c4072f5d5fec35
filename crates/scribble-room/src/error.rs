//! Error types for the room layer.

use scribble_protocol::{Action, Phase, PlayerId, RoomId};

/// Errors returned to callers outside a room: admission and lookup.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this id.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full: no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player was kicked from this room earlier.
    #[error("player {0} is banned from room {1}")]
    Banned(PlayerId, RoomId),

    /// The room's mailbox is closed: it is shutting down or gone.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

/// Why a room rejected a player's action.
///
/// These never leave the room actor: the action is logged at `debug`,
/// dropped, and the game carries on.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Only the owner may start the game or kick players.
    #[error("player {0} is not the owner")]
    NotOwner(PlayerId),

    /// Board edits and picks belong to the drawer; guesses to everyone else.
    #[error("not player {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("player {0} already guessed the word this round")]
    AlreadyAnswered(PlayerId),

    #[error("player {0} is not in this room")]
    PlayerNotFound(PlayerId),

    #[error("need {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    /// A pick that is not one of the two offered words.
    #[error("{0:?} was not offered")]
    InvalidWord(String),

    #[error("the owner cannot kick themselves")]
    CannotKickSelf,

    /// The action means nothing in the current phase.
    #[error("{action} is not accepted while {phase}")]
    UnexpectedAction { action: Action, phase: Phase },
}

/// Errors from the durable room record backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no record for room {0}")]
    RecordNotFound(RoomId),

    /// The backend itself failed (network, quota, serialization).
    #[error("store backend failed: {0}")]
    Backend(String),
}
