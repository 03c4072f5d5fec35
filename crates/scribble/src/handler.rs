//! Per-connection handler: join path, auth, admission, and the pumps.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Parse `/games/<room-id>?token=<credential>` from the upgrade request
//!   2. Authenticate the credential → `Identity`
//!   3. Record the session (one game per player) and admit to the room
//!   4. Run the write pump in its own task and the read pump in this one
//!
//! Every refusal closes the socket with an application close code.

use std::sync::Arc;

use scribble_protocol::{Codec, PlayerId, RoomId};
use scribble_room::{Admission, Player, RoomError, RoomStore, read_pump, write_pump};
use scribble_session::Authenticator;
use scribble_transport::{Connection, WebSocketConnection};

use crate::ScribbleError;
use crate::server::ServerState;

/// The request path is not `/games/<id>?token=<credential>`.
pub const CLOSE_BAD_REQUEST: u16 = 4400;
/// The credential was rejected.
pub const CLOSE_UNAUTHORIZED: u16 = 4401;
/// The player was kicked from this game earlier.
pub const CLOSE_BANNED: u16 = 4403;
/// No such game, or it is shutting down.
pub const CLOSE_NOT_FOUND: u16 = 4404;
/// The player is already in a game, or this one is full.
pub const CLOSE_CONFLICT: u16 = 4409;

/// Drop guard that releases a player's session when the handler exits.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async lock.
struct SessionGuard<A: Authenticator, S: RoomStore, K: Codec> {
    player_id: PlayerId,
    room_id: RoomId,
    state: Arc<ServerState<A, S, K>>,
}

impl<A: Authenticator, S: RoomStore, K: Codec> Drop for SessionGuard<A, S, K> {
    fn drop(&mut self) {
        let (player_id, room_id) = (self.player_id, self.room_id);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.sessions.lock().await.release(player_id, room_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, S, K>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, S, K>>,
) -> Result<(), ScribbleError>
where
    A: Authenticator,
    S: RoomStore,
    K: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, path = conn.path(), "handling new connection");

    // --- Step 1: Join path ---
    let Some((room_id, token)) = parse_join_path(conn.path()) else {
        return reject(&conn, CLOSE_BAD_REQUEST, "expected /games/<id>?token=<token>").await;
    };

    // --- Step 2: Authenticate ---
    let identity = match state.auth.authenticate(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "authentication failed");
            return reject(&conn, CLOSE_UNAUTHORIZED, "unauthorized").await;
        }
    };
    let player_id = identity.player_id;
    tracing::info!(%conn_id, %player_id, %room_id, "player authenticated");

    let room = match state.rooms.room(room_id) {
        Ok(room) => room,
        Err(e) => return reject_room(&conn, &e).await,
    };

    // --- Step 3: Session, then admission ---
    // The guard only exists once the session does.
    let entered = state
        .sessions
        .lock()
        .await
        .enter(identity.clone(), room_id)
        .map(drop);
    if let Err(e) = entered {
        tracing::debug!(%conn_id, error = %e, "session refused");
        return reject(&conn, CLOSE_CONFLICT, "already in a game").await;
    }
    let _guard = SessionGuard {
        player_id,
        room_id,
        state: Arc::clone(&state),
    };

    let (player, outbound) = Player::channel(player_id, identity.name);
    match room.admit(player).await {
        Ok(Admission::Joined) => {}
        Ok(Admission::AlreadyPresent) => {
            return reject(&conn, CLOSE_CONFLICT, "already in this game").await;
        }
        Err(e) => return reject_room(&conn, &e).await,
    }

    // --- Step 4: Pumps ---
    let conn = Arc::new(conn);
    let writer = tokio::spawn(write_pump(
        Arc::clone(&conn),
        outbound,
        Arc::clone(&state.codec),
    ));
    read_pump(conn, player_id, room, Arc::clone(&state.codec)).await;

    // The room drops the player after the quit; that ends the writer.
    if let Err(e) = writer.await {
        tracing::warn!(%conn_id, %player_id, error = %e, "write pump panicked");
    }
    tracing::info!(%conn_id, %player_id, %room_id, "connection finished");

    // _guard drops here → session release fires.
    Ok(())
}

/// Splits `/games/<room-id>?token=<credential>` into its parts.
fn parse_join_path(path: &str) -> Option<(RoomId, String)> {
    let (path, query) = path.split_once('?')?;
    let room_id = path
        .strip_prefix("/games/")?
        .trim_end_matches('/')
        .parse()
        .ok()?;
    let token = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|t| !t.is_empty())?;
    Some((RoomId(room_id), token.to_string()))
}

/// The close code a failed room lookup or admission maps to.
fn close_code(err: &RoomError) -> u16 {
    match err {
        RoomError::NotFound(_) | RoomError::Unavailable(_) => CLOSE_NOT_FOUND,
        RoomError::Banned(..) => CLOSE_BANNED,
        RoomError::RoomFull(_) => CLOSE_CONFLICT,
    }
}

async fn reject_room(conn: &WebSocketConnection, err: &RoomError) -> Result<(), ScribbleError> {
    tracing::debug!(conn_id = %conn.id(), error = %err, "admission refused");
    reject(conn, close_code(err), &err.to_string()).await
}

async fn reject(conn: &WebSocketConnection, code: u16, reason: &str) -> Result<(), ScribbleError> {
    conn.close_with(code, reason).await?;
    Ok(())
}
