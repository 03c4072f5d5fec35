//! The durable room record: a best-effort mirror of each game for
//! listings and discovery.
//!
//! The running room is authoritative for gameplay. The record only
//! follows along: every update is queued to a per-room mirror task that
//! applies them in order and logs failures instead of surfacing them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use scribble_protocol::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{RoomSettings, StoreError, Visibility};

/// The stored document for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub owner: PlayerId,
    pub visibility: Visibility,
    pub language: String,
    pub target_score: u32,
    pub max_players: usize,
    pub player_count: i64,
    pub current_players: Vec<PlayerId>,
    pub banned_players: Vec<PlayerId>,
}

impl RoomRecord {
    /// A fresh record for a room nobody has joined yet.
    pub fn from_settings(settings: &RoomSettings) -> Self {
        Self {
            owner: settings.owner,
            visibility: settings.visibility,
            language: settings.language.clone(),
            target_score: settings.target_score,
            max_players: settings.max_players,
            player_count: 0,
            current_players: Vec::new(),
            banned_players: Vec::new(),
        }
    }
}

/// A numeric field of [`RoomRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    PlayerCount,
}

/// A player-list field of [`RoomRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerList {
    CurrentPlayers,
    BannedPlayers,
}

/// A document store holding [`RoomRecord`]s.
///
/// Shaped after document databases: field-level increments and set-like
/// array updates, so concurrent writers don't need read-modify-write.
pub trait RoomStore: Send + Sync + 'static {
    fn create(
        &self,
        room_id: RoomId,
        record: RoomRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn increment(
        &self,
        room_id: RoomId,
        counter: Counter,
        delta: i64,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Adds `player` to the list unless already present.
    fn array_union(
        &self,
        room_id: RoomId,
        list: PlayerList,
        player: PlayerId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Removes every occurrence of `player` from the list.
    fn array_remove(
        &self,
        room_id: RoomId,
        list: PlayerList,
        player: PlayerId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn delete(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn get(
        &self,
        room_id: RoomId,
    ) -> impl std::future::Future<Output = Result<RoomRecord, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryRoomStore
// ---------------------------------------------------------------------------

/// A [`RoomStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    records: Mutex<HashMap<RoomId, RoomRecord>>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RoomId, RoomRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut RoomRecord),
    ) -> Result<(), StoreError> {
        let mut records = self.lock();
        let record = records
            .get_mut(&room_id)
            .ok_or(StoreError::RecordNotFound(room_id))?;
        f(record);
        Ok(())
    }
}

fn list_mut(record: &mut RoomRecord, list: PlayerList) -> &mut Vec<PlayerId> {
    match list {
        PlayerList::CurrentPlayers => &mut record.current_players,
        PlayerList::BannedPlayers => &mut record.banned_players,
    }
}

impl RoomStore for MemoryRoomStore {
    async fn create(&self, room_id: RoomId, record: RoomRecord) -> Result<(), StoreError> {
        self.lock().insert(room_id, record);
        Ok(())
    }

    async fn increment(
        &self,
        room_id: RoomId,
        counter: Counter,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.update(room_id, |r| match counter {
            Counter::PlayerCount => r.player_count += delta,
        })
    }

    async fn array_union(
        &self,
        room_id: RoomId,
        list: PlayerList,
        player: PlayerId,
    ) -> Result<(), StoreError> {
        self.update(room_id, |r| {
            let list = list_mut(r, list);
            if !list.contains(&player) {
                list.push(player);
            }
        })
    }

    async fn array_remove(
        &self,
        room_id: RoomId,
        list: PlayerList,
        player: PlayerId,
    ) -> Result<(), StoreError> {
        self.update(room_id, |r| list_mut(r, list).retain(|p| *p != player))
    }

    async fn delete(&self, room_id: RoomId) -> Result<(), StoreError> {
        self.lock()
            .remove(&room_id)
            .map(drop)
            .ok_or(StoreError::RecordNotFound(room_id))
    }

    async fn get(&self, room_id: RoomId) -> Result<RoomRecord, StoreError> {
        self.lock()
            .get(&room_id)
            .cloned()
            .ok_or(StoreError::RecordNotFound(room_id))
    }
}

// ---------------------------------------------------------------------------
// Mirror task
// ---------------------------------------------------------------------------

/// One queued update to a room's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordOp {
    Joined(PlayerId),
    Left(PlayerId),
    Banned(PlayerId),
    Delete,
}

/// The room's end of its mirror task. Never blocks and never fails.
#[derive(Debug)]
pub(crate) struct RecordMirror {
    ops: mpsc::UnboundedSender<RecordOp>,
}

impl RecordMirror {
    pub(crate) fn send(&self, op: RecordOp) {
        // The task only stops once every sender is gone.
        let _ = self.ops.send(op);
    }
}

/// Spawns the task that applies a room's record updates in order.
///
/// The task exits after the returned mirror is dropped and the queue
/// has drained.
pub(crate) fn spawn_mirror<S: RoomStore>(room_id: RoomId, store: Arc<S>) -> RecordMirror {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            if let Err(e) = apply(store.as_ref(), room_id, op).await {
                warn!(%room_id, ?op, error = %e, "room record update failed");
            }
        }
        debug!(%room_id, "record mirror stopped");
    });
    RecordMirror { ops: tx }
}

async fn apply<S: RoomStore>(store: &S, room_id: RoomId, op: RecordOp) -> Result<(), StoreError> {
    match op {
        RecordOp::Joined(player) => {
            store
                .array_union(room_id, PlayerList::CurrentPlayers, player)
                .await?;
            store.increment(room_id, Counter::PlayerCount, 1).await
        }
        RecordOp::Left(player) => {
            store
                .array_remove(room_id, PlayerList::CurrentPlayers, player)
                .await?;
            store.increment(room_id, Counter::PlayerCount, -1).await
        }
        RecordOp::Banned(player) => {
            store
                .array_union(room_id, PlayerList::BannedPlayers, player)
                .await
        }
        RecordOp::Delete => store.delete(room_id).await,
    }
}
