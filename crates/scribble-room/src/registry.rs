//! Process-wide directory of running rooms.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use scribble_protocol::RoomId;

use crate::{RoomError, RoomHandle};

/// Maps room ids to handles of running room actors.
///
/// Created once at server start and shared via `Arc`. The lock is held
/// only for the map operation itself, never across an `.await`.
///
/// A handle returned by [`get`](Self::get) may belong to a room that is
/// shutting down; its operations then fail with
/// [`RoomError::Unavailable`].
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a room, replacing any handle under the same id.
    pub fn set(&self, room_id: RoomId, handle: RoomHandle) {
        self.rooms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(room_id, handle);
    }

    /// Looks a room up.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no room is registered under `room_id`.
    pub fn get(&self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&room_id)
            .cloned()
            .ok_or(RoomError::NotFound(room_id))
    }

    /// Deregisters a room. Returns the removed handle, if any.
    pub fn delete(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.rooms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all registered rooms, in no particular order.
    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}
