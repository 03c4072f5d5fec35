//! `ScribbleServer` builder and server loop.
//!
//! This is the entry point for running a Scribble game server. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;

use scribble_protocol::{Codec, JsonCodec, RoomId};
use scribble_room::{RoomConfig, RoomManager, RoomRegistry, RoomSettings, RoomStore};
use scribble_session::{Authenticator, SessionManager};
use scribble_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::ScribbleError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
/// Interior mutability via `Mutex` where needed.
pub(crate) struct ServerState<A: Authenticator, S: RoomStore, K: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: RoomManager<S>,
    pub(crate) auth: A,
    pub(crate) codec: Arc<K>,
}

/// Builder for configuring and starting a Scribble server.
///
/// # Example
///
/// ```rust,no_run
/// use scribble::prelude::*;
///
/// # async fn run() -> Result<(), ScribbleError> {
/// let auth = MemoryAuthenticator::new()
///     .with_token("secret", Identity::new(PlayerId(1), "ana"));
/// let server = ScribbleServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(auth, MemoryRoomStore::new())
///     .await?;
/// let room = server
///     .create_room(RoomSettings::new(PlayerId(1), ["cat", "dog"]))
///     .await;
/// println!("join at /games/{}?token=secret", room.0);
/// server.run().await
/// # }
/// ```
pub struct ScribbleServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl ScribbleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration shared by every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server around the given
    /// authenticator and room store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<A, S>(
        self,
        auth: A,
        store: S,
    ) -> Result<ScribbleServer<A, S, JsonCodec>, ScribbleError>
    where
        A: Authenticator,
        S: RoomStore,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let rooms = RoomManager::new(
            self.room_config,
            Arc::new(RoomRegistry::new()),
            Arc::new(store),
        );
        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms,
            auth,
            codec: Arc::new(JsonCodec),
        });

        Ok(ScribbleServer { transport, state })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Scribble game server bound to its listener.
///
/// Create rooms with [`create_room`](Self::create_room), then call
/// [`run()`](Self::run) to start accepting connections.
pub struct ScribbleServer<A: Authenticator, S: RoomStore, K: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, S, K>>,
}

impl<A, S, K> ScribbleServer<A, S, K>
where
    A: Authenticator,
    S: RoomStore,
    K: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Creates a game and returns its id. Players join it at
    /// `/games/<id>?token=<credential>`.
    pub async fn create_room(&self, settings: RoomSettings) -> RoomId {
        self.state.rooms.create_room(settings).await.room_id()
    }

    /// The directory of running rooms. Stays valid after [`run`](Self::run)
    /// takes the server.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(self.state.rooms.registry())
    }

    /// The durable room record store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(self.state.rooms.store())
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ScribbleError> {
        tracing::info!(addr = ?self.local_addr().ok(), "scribble server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
