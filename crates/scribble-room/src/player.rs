//! A seated player and the two pumps that connect them to their room.
//!
//! ```text
//!             read_pump                          write_pump
//! socket ──recv──decode──▶ room mailbox   outbound queue ──encode──send──▶ socket
//! ```
//!
//! The pumps never touch game state. They only move messages between the
//! socket and the room's queues.

use std::sync::Arc;

use scribble_protocol::{Codec, Message, PlayerEntry, PlayerId};
use scribble_transport::Connection;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::RoomHandle;

/// Channel the room uses to deliver messages to one player.
pub type PlayerSender = mpsc::UnboundedSender<Message>;

/// A player as the room sees them.
///
/// Dropping a `Player` drops its outbound sender, which ends its
/// [`write_pump`] with a normal close.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    score: u32,
    outbound: PlayerSender,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, outbound: PlayerSender) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            outbound,
        }
    }

    /// A player together with the receiving end of its outbound queue.
    pub fn channel(
        id: PlayerId,
        name: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, name, tx), rx)
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Adds points and returns the new score.
    pub(crate) fn award(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub(crate) fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Queues a message. Silently drops it if the pump is gone.
    pub(crate) fn send(&self, msg: Message) {
        let _ = self.outbound.send(msg);
    }

    pub fn entry(&self) -> PlayerEntry {
        PlayerEntry {
            id: self.id,
            name: self.name.clone(),
            score: self.score,
        }
    }
}

/// Reads from the socket and submits each message to the room, stamped
/// with `player_id`.
///
/// Unknown actions and malformed payloads are dropped. A read error, a
/// clean close, or a fatal decode error ends the pump with a synthetic
/// `quit`, unless the room is already gone.
pub async fn read_pump<C, K>(conn: Arc<C>, player_id: PlayerId, room: RoomHandle, codec: Arc<K>)
where
    C: Connection,
    K: Codec,
{
    let room_id = room.room_id();
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(%room_id, %player_id, conn = %conn.id(), "connection closed by peer");
                break;
            }
            Err(e) => {
                debug!(%room_id, %player_id, error = %e, "read failed, treating as disconnect");
                break;
            }
        };

        match codec.decode_message(&data) {
            Ok(msg) => {
                trace!(%room_id, %player_id, action = %msg.action(), "inbound");
                if room.submit(player_id, msg).await.is_err() {
                    // Room closed under us; nobody to tell.
                    return;
                }
            }
            Err(e) if !e.is_fatal() => {
                debug!(%room_id, %player_id, error = %e, "dropping undecodable message");
            }
            Err(e) => {
                debug!(%room_id, %player_id, error = %e, "fatal decode error, disconnecting");
                break;
            }
        }
    }

    let _ = room.submit(player_id, Message::Quit(player_id)).await;
}

/// Drains a player's outbound queue onto the socket in order.
///
/// When the room drops the player (queue closed), sends a normal close
/// frame and returns. A failed send ends the pump early.
pub async fn write_pump<C, K>(
    conn: Arc<C>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    codec: Arc<K>,
) where
    C: Connection,
    K: Codec,
{
    while let Some(msg) = outbound.recv().await {
        let bytes = match codec.encode_message(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(conn = %conn.id(), error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            debug!(conn = %conn.id(), error = %e, "send failed, stopping writer");
            return;
        }
    }

    if let Err(e) = conn.close().await {
        trace!(conn = %conn.id(), error = %e, "close after queue shutdown failed");
    }
}
