//! Player session management for Scribble.
//!
//! This crate handles who a connection belongs to and where that player is:
//!
//! 1. **Authentication**: turning a bearer credential into an [`Identity`]
//!    ([`Authenticator`] trait, [`MemoryAuthenticator`] for development)
//! 2. **Session tracking**: knowing which game each player is in, and
//!    refusing a second game ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← authenticates, then records the session before admission
//!     ↕
//! Session Layer (this crate)  ← player identity and current game
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, RoomId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;

pub use auth::{Authenticator, Identity, MemoryAuthenticator};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::Session;
