//! Core protocol types for Scribble's wire format.
//!
//! Every message on the wire is a JSON object with an `action` tag and an
//! action-specific `payload`:
//!
//! ```text
//! {"action": "guess", "payload": "giraffe"}
//! {"action": "update-score", "payload": {"id": 7, "score": 19}}
//! {"action": "start"}
//! ```
//!
//! The tag decides the payload shape. There is no free-form payload: each
//! variant of [`Message`] carries its own concrete type, and the decoder
//! rejects a payload that does not match its action.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// A "newtype wrapper" around `u64`: you can't pass a `RoomId` where a
/// `PlayerId` is expected, even though both are numbers underneath.
/// `#[serde(transparent)]` keeps the wire form a plain number (`42`, not
/// `{"0": 42}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a game (a "room").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the game.
    All,
    /// One specific player.
    Player(PlayerId),
    /// Everyone except the given player (usually the one who caused it).
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The phase a game is in.
///
/// ```text
/// Waiting → Starting → Picking → Drawing → Ending → Waiting
///              ↑          │         │
///              └──────────┴─────────┘   (timeouts, round over)
///
/// any transient phase ──(last player leaves)──→ Closing
/// ```
///
/// Serialized in kebab-case so the `greet` snapshot reads `"phase": "picking"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Waiting,
    Starting,
    Picking,
    Drawing,
    Ending,
    Closing,
}

impl Phase {
    /// `Closing` is the only terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closing)
    }

    /// The wire name of this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Starting => "starting",
            Self::Picking => "picking",
            Self::Drawing => "drawing",
            Self::Ending => "ending",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// A player as listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// A chat line. Clients send only `text`; the server stamps `from` before
/// relaying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PlayerId>,
    pub text: String,
}

impl ChatLine {
    /// A chat line as a client sends it.
    pub fn new(text: impl Into<String>) -> Self {
        Self { from: None, text: text.into() }
    }
}

/// The `pick` payload: the two-word offer sent to the drawer, or the
/// drawer's choice sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pick {
    Word(String),
    Offer([String; 2]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Start and end point of a line, rectangle, or circle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub id: PlayerId,
    pub score: u32,
}

/// Everything a newly admitted player needs to render the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub owner: PlayerId,
    pub drawer: Option<PlayerId>,
    pub players: Vec<PlayerEntry>,
    /// Accepted drawing commands of the current board, oldest first.
    pub board: Vec<Message>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One game message, in either direction.
///
/// `#[serde(tag = "action", content = "payload")]` is serde's "adjacently
/// tagged" representation: the variant name goes in `action`, its data in
/// `payload`, and unit variants have no `payload` at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "kebab-case")]
pub enum Message {
    Greet(Snapshot),
    Join(PlayerEntry),
    Quit(PlayerId),
    Kick(PlayerId),
    NewOwner(PlayerId),
    Chat(ChatLine),
    Guess(String),
    Start,
    Pick(Pick),

    // -- Board editing, relayed verbatim --
    Draw(Vec<i32>),
    Erase(Vec<i32>),
    Line(Segment),
    RectDraw(Segment),
    RectFill(Segment),
    CircleDraw(Segment),
    CircleFill(Segment),
    ChangeColor(String),
    ChangePencilSize(u32),
    ChangeEraserSize(u32),
    ClearBoard,

    CorrectGuess(PlayerId),
    UpdateScore(ScoreUpdate),

    // -- Phase announcements --
    Waiting,
    /// Carries the drawer of the coming round.
    Starting(PlayerId),
    Picking,
    Drawing,
    Ending,
}

impl Message {
    /// The action tag of this message.
    pub fn action(&self) -> Action {
        match self {
            Self::Greet(_) => Action::Greet,
            Self::Join(_) => Action::Join,
            Self::Quit(_) => Action::Quit,
            Self::Kick(_) => Action::Kick,
            Self::NewOwner(_) => Action::NewOwner,
            Self::Chat(_) => Action::Chat,
            Self::Guess(_) => Action::Guess,
            Self::Start => Action::Start,
            Self::Pick(_) => Action::Pick,
            Self::Draw(_) => Action::Draw,
            Self::Erase(_) => Action::Erase,
            Self::Line(_) => Action::Line,
            Self::RectDraw(_) => Action::RectDraw,
            Self::RectFill(_) => Action::RectFill,
            Self::CircleDraw(_) => Action::CircleDraw,
            Self::CircleFill(_) => Action::CircleFill,
            Self::ChangeColor(_) => Action::ChangeColor,
            Self::ChangePencilSize(_) => Action::ChangePencilSize,
            Self::ChangeEraserSize(_) => Action::ChangeEraserSize,
            Self::ClearBoard => Action::ClearBoard,
            Self::CorrectGuess(_) => Action::CorrectGuess,
            Self::UpdateScore(_) => Action::UpdateScore,
            Self::Waiting => Action::Waiting,
            Self::Starting(_) => Action::Starting,
            Self::Picking => Action::Picking,
            Self::Drawing => Action::Drawing,
            Self::Ending => Action::Ending,
        }
    }

    /// Whether this is one of the drawing-family commands.
    pub fn is_board_edit(&self) -> bool {
        self.action().is_board_edit()
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The action tag alone, without a payload.
///
/// Decoding looks the tag up here first, so an unknown tag and a bad
/// payload produce different errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Greet,
    Join,
    Quit,
    Kick,
    NewOwner,
    Chat,
    Guess,
    Start,
    Pick,
    Draw,
    Erase,
    Line,
    RectDraw,
    RectFill,
    CircleDraw,
    CircleFill,
    ChangeColor,
    ChangePencilSize,
    ChangeEraserSize,
    ClearBoard,
    CorrectGuess,
    UpdateScore,
    Waiting,
    Starting,
    Picking,
    Drawing,
    Ending,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 27] = [
        Self::Greet,
        Self::Join,
        Self::Quit,
        Self::Kick,
        Self::NewOwner,
        Self::Chat,
        Self::Guess,
        Self::Start,
        Self::Pick,
        Self::Draw,
        Self::Erase,
        Self::Line,
        Self::RectDraw,
        Self::RectFill,
        Self::CircleDraw,
        Self::CircleFill,
        Self::ChangeColor,
        Self::ChangePencilSize,
        Self::ChangeEraserSize,
        Self::ClearBoard,
        Self::CorrectGuess,
        Self::UpdateScore,
        Self::Waiting,
        Self::Starting,
        Self::Picking,
        Self::Drawing,
        Self::Ending,
    ];

    /// The wire tag, matching the serde representation of [`Message`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greet => "greet",
            Self::Join => "join",
            Self::Quit => "quit",
            Self::Kick => "kick",
            Self::NewOwner => "new-owner",
            Self::Chat => "chat",
            Self::Guess => "guess",
            Self::Start => "start",
            Self::Pick => "pick",
            Self::Draw => "draw",
            Self::Erase => "erase",
            Self::Line => "line",
            Self::RectDraw => "rect-draw",
            Self::RectFill => "rect-fill",
            Self::CircleDraw => "circle-draw",
            Self::CircleFill => "circle-fill",
            Self::ChangeColor => "change-color",
            Self::ChangePencilSize => "change-pencil-size",
            Self::ChangeEraserSize => "change-eraser-size",
            Self::ClearBoard => "clear-board",
            Self::CorrectGuess => "correct-guess",
            Self::UpdateScore => "update-score",
            Self::Waiting => "waiting",
            Self::Starting => "starting",
            Self::Picking => "picking",
            Self::Drawing => "drawing",
            Self::Ending => "ending",
        }
    }

    pub fn is_board_edit(self) -> bool {
        matches!(
            self,
            Self::Draw
                | Self::Erase
                | Self::Line
                | Self::RectDraw
                | Self::RectFill
                | Self::CircleDraw
                | Self::CircleFill
                | Self::ChangeColor
                | Self::ChangePencilSize
                | Self::ChangeEraserSize
                | Self::ClearBoard
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ProtocolError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == tag)
            .ok_or_else(|| ProtocolError::UnknownAction(tag.to_string()))
    }
}

// =========================================================================
// Tests
// =========================================================================
