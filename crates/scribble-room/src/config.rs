//! Room configuration: server-wide defaults and per-game settings.

use std::time::Duration;

use scribble_protocol::{Phase, PlayerId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PhaseTimings
// ---------------------------------------------------------------------------

/// How long each timed phase lasts before it advances on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Starting → Picking.
    pub starting: Duration,
    /// Picking → Starting when the drawer doesn't pick.
    pub picking: Duration,
    /// Drawing → Starting when nobody finishes the round.
    pub drawing: Duration,
    /// Ending → Waiting.
    pub ending: Duration,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            starting: Duration::from_secs(5),
            picking: Duration::from_secs(10),
            drawing: Duration::from_secs(60),
            ending: Duration::from_secs(15),
        }
    }
}

impl PhaseTimings {
    /// The timer a phase arms on entry. `None` for untimed phases.
    pub fn for_phase(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::Starting => Some(self.starting),
            Phase::Picking => Some(self.picking),
            Phase::Drawing => Some(self.drawing),
            Phase::Ending => Some(self.ending),
            Phase::Waiting | Phase::Closing => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Server-wide room behavior, shared by every game the server hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum players required for the owner to start.
    pub min_players: usize,

    /// Phase durations.
    pub timings: PhaseTimings,

    /// Capacity of each room's command mailbox. Senders wait when it is
    /// full (bounded channel).
    pub mailbox_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            timings: PhaseTimings::default(),
            mailbox_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomSettings
// ---------------------------------------------------------------------------

/// Whether a game shows up in public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Parameters of one game, chosen by its owner at creation.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub owner: PlayerId,
    /// First player to reach this score ends the game.
    pub target_score: u32,
    pub max_players: usize,
    pub visibility: Visibility,
    pub language: String,
    /// Raw word list; normalized into a dictionary when the room spawns.
    pub words: Vec<String>,
}

impl RoomSettings {
    pub const DEFAULT_TARGET_SCORE: u32 = 100;
    pub const DEFAULT_MAX_PLAYERS: usize = 8;

    /// Settings with defaults for everything but the owner and words.
    pub fn new<I, W>(owner: PlayerId, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        Self {
            owner,
            target_score: Self::DEFAULT_TARGET_SCORE,
            max_players: Self::DEFAULT_MAX_PLAYERS,
            visibility: Visibility::default(),
            language: "en".into(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_target_score(mut self, target_score: u32) -> Self {
        self.target_score = target_score;
        self
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
