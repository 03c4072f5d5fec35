//! Wire protocol for Scribble.
//!
//! This crate defines the "language" that the browser client and the game
//! server speak:
//!
//! - **Types** ([`Message`], [`Snapshot`], [`Phase`], ids): the message
//!   vocabulary, one payload shape per action.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]): unknown actions, malformed payloads,
//!   and broken framing.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Room (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Action, ChatLine, Message, Phase, Pick, PlayerEntry, PlayerId, Point,
    Recipient, RoomId, ScoreUpdate, Segment, Snapshot,
};
