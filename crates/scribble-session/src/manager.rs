//! The session manager: which player sits in which game.
//!
//! A player may be seated in at most one game. The server records the
//! session right after authentication and before asking the room to admit
//! the player, and releases it when the player's connection ends.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself; it uses a plain
//! `HashMap`. The server wraps it in a mutex and only holds the lock for
//! single map operations, never across an `.await`.

use std::collections::HashMap;

use scribble_protocol::{PlayerId, RoomId};

use crate::{Identity, Session, SessionError};

/// Tracks the current game of every seated player.
///
/// ## Lifecycle
///
/// ```text
/// authenticate() ──→ enter() ──→ room admits ──→ ... ──→ release()
///                      │
///                      └──(already seated)──→ AlreadyInGame
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a player in a game.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyInGame`] if the player is already
    /// seated anywhere, including the same game (a second connection for
    /// the same player is refused).
    pub fn enter(
        &mut self,
        identity: Identity,
        room_id: RoomId,
    ) -> Result<&Session, SessionError> {
        let player_id = identity.player_id;
        if let Some(existing) = self.sessions.get(&player_id) {
            return Err(SessionError::AlreadyInGame(player_id, existing.room_id));
        }

        tracing::info!(%player_id, %room_id, "session created");
        Ok(self
            .sessions
            .entry(player_id)
            .or_insert_with(|| Session::new(identity, room_id)))
    }

    /// Releases a player's seat, but only if it is in `room_id`.
    ///
    /// The room check keeps a late cleanup from one connection from
    /// unseating a newer session of the same player elsewhere. Returns
    /// the removed session.
    pub fn release(&mut self, player_id: PlayerId, room_id: RoomId) -> Option<Session> {
        match self.sessions.get(&player_id) {
            Some(s) if s.room_id == room_id => {
                tracing::info!(
                    %player_id,
                    %room_id,
                    seated_secs = s.age().as_secs(),
                    "session released"
                );
                self.sessions.remove(&player_id)
            }
            _ => None,
        }
    }

    /// The game a player is seated in, if any.
    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        self.sessions.get(&player_id).map(|s| s.room_id)
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Number of seated players.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
