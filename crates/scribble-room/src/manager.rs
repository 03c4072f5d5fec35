//! Room manager: creates rooms and routes players to them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use scribble_protocol::RoomId;

use crate::room::spawn_room;
use crate::store::spawn_mirror;
use crate::{
    Admission, Player, RoomConfig, RoomError, RoomHandle, RoomRecord, RoomRegistry, RoomSettings,
    RoomStore,
};

/// The entry point for room operations from the server.
///
/// Owns the id counter and the store, and shares the [`RoomRegistry`]
/// with every room it spawns so rooms can deregister themselves.
pub struct RoomManager<S: RoomStore> {
    registry: Arc<RoomRegistry>,
    store: Arc<S>,
    config: RoomConfig,
    /// Counter for generating unique room IDs.
    next_id: AtomicU64,
}

impl<S: RoomStore> RoomManager<S> {
    pub fn new(config: RoomConfig, registry: Arc<RoomRegistry>, store: Arc<S>) -> Self {
        Self {
            registry,
            store,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a new room, registers it, and returns its handle.
    ///
    /// The durable record is written first; a store failure is logged and
    /// the room is created anyway.
    pub async fn create_room(&self, settings: RoomSettings) -> RoomHandle {
        let room_id = RoomId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let record = RoomRecord::from_settings(&settings);
        if let Err(e) = self.store.create(room_id, record).await {
            tracing::warn!(%room_id, error = %e, "failed to write room record");
        }

        let mirror = spawn_mirror(room_id, Arc::clone(&self.store));
        let owner = settings.owner;
        let handle = spawn_room(
            room_id,
            settings,
            &self.config,
            Arc::clone(&self.registry),
            mirror,
        );
        self.registry.set(room_id, handle.clone());
        tracing::info!(%room_id, %owner, "room created");
        handle
    }

    /// Seats a player in a registered room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room is registered, otherwise
    /// whatever the room's admission returns.
    pub async fn admit(&self, room_id: RoomId, player: Player) -> Result<Admission, RoomError> {
        self.registry.get(room_id)?.admit(player).await
    }

    /// Looks up a running room.
    pub fn room(&self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.registry.get(room_id)
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Returns the number of running rooms.
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }
}
