//! The server's record of a seated player.

use std::time::{Duration, Instant};

use scribble_protocol::{PlayerId, RoomId};

use crate::Identity;

/// One player seated in one game.
///
/// Created by [`SessionManager::enter`](crate::SessionManager::enter)
/// before the room admits the player, and released when their connection
/// goes away.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    /// Display name, as the authenticator reported it.
    pub name: String,
    pub room_id: RoomId,
    /// Monotonic time the player sat down.
    pub since: Instant,
}

impl Session {
    pub(crate) fn new(identity: Identity, room_id: RoomId) -> Self {
        Self {
            player_id: identity.player_id,
            name: identity.name,
            room_id,
            since: Instant::now(),
        }
    }

    /// How long the player has been in the game.
    pub fn age(&self) -> Duration {
        self.since.elapsed()
    }
}
