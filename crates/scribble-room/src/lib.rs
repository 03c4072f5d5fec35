//! Game rooms for Scribble.
//!
//! Each game runs as an isolated Tokio task (actor model) that owns its
//! players, word pool, board, and phase timer. Everything else talks to
//! it through a [`RoomHandle`].
//!
//! # Key types
//!
//! - [`RoomManager`]: creates rooms and routes players to them
//! - [`RoomRegistry`]: process-wide room id → handle directory
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomStore`]: durable room records, mirrored best-effort
//! - [`read_pump`] / [`write_pump`]: move messages between a socket and a room

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod manager;
mod player;
mod registry;
mod room;
mod roster;
pub mod scoring;
mod store;
mod words;

pub use config::{PhaseTimings, RoomConfig, RoomSettings, Visibility};
pub use error::{GameError, RoomError, StoreError};
pub use manager::RoomManager;
pub use player::{Player, PlayerSender, read_pump, write_pump};
pub use registry::RoomRegistry;
pub use room::{Admission, RoomHandle, RoomInfo};
pub use store::{Counter, MemoryRoomStore, PlayerList, RoomRecord, RoomStore};
pub use words::{Dictionary, WordPool};
