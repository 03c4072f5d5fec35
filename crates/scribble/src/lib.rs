//! # Scribble
//!
//! Real-time game server for a multiplayer drawing-and-guessing game.
//!
//! One player draws a secret word while the others guess it in chat;
//! turns rotate and points accumulate toward a target score. Every game
//! runs as its own actor task; players connect over WebSocket at
//! `/games/<room-id>?token=<credential>`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn run() -> Result<(), ScribbleError> {
//! let server = ScribbleServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(MemoryAuthenticator::new(), MemoryRoomStore::new())
//!     .await?;
//! server
//!     .create_room(RoomSettings::new(PlayerId(1), ["cat", "dog", "owl"]))
//!     .await;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod handler;
mod server;

pub use error::ScribbleError;
pub use handler::{
    CLOSE_BAD_REQUEST, CLOSE_BANNED, CLOSE_CONFLICT, CLOSE_NOT_FOUND, CLOSE_UNAUTHORIZED,
};
pub use server::{ScribbleServer, ScribbleServerBuilder};

/// Everything needed to run a server, in one import.
pub mod prelude {
    pub use crate::{ScribbleError, ScribbleServer, ScribbleServerBuilder};
    pub use scribble_protocol::{Message, Phase, PlayerId, RoomId};
    pub use scribble_room::{
        MemoryRoomStore, PhaseTimings, RoomConfig, RoomSettings, RoomStore, Visibility,
    };
    pub use scribble_session::{Authenticator, Identity, MemoryAuthenticator, SessionError};
}
