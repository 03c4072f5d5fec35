//! The phase state machine: entry and exit actions, timeouts, and what
//! each phase accepts.
//!
//! ```text
//! Waiting ──start──▶ Starting ──5s──▶ Picking ──pick──▶ Drawing ──round over──▶ Starting
//!    ▲                   ▲               │                 │
//!    │                   └─────10s───────┘                 ├──60s──▶ Starting
//!    │                                                     └──target──▶ Ending ──15s──┐
//!    └─────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A transition always runs exit of the old phase, then assignment, then
//! entry of the new one. Entry may ask for an immediate follow-up
//! transition (for example Picking with an exhausted word pool).

use scribble_protocol::{Action, ChatLine, Message, Phase, Pick, PlayerId, Recipient, ScoreUpdate};
use tracing::{debug, info};

use super::Game;
use crate::GameError;
use crate::store::RecordOp;
use crate::scoring::{DRAWER_BONUS, ROUND_COMPLETE_BONUS, guess_award};

/// Result of handling one action: the phase to move to, if any.
type Handled = Result<Option<Phase>, GameError>;

impl Game {
    pub(super) fn transition(&mut self, next: Phase) {
        let mut next = Some(next);
        while let Some(phase) = next.take() {
            self.exit();
            debug!(room_id = %self.room_id, from = %self.phase, to = %phase, "phase transition");
            self.phase = phase;
            next = self.enter();
        }
    }

    fn exit(&mut self) {
        match self.phase {
            Phase::Starting | Phase::Drawing | Phase::Ending => {
                self.timer.cancel();
            }
            Phase::Picking => {
                self.timer.cancel();
                self.offer = None;
            }
            Phase::Waiting | Phase::Closing => {}
        }
    }

    fn enter(&mut self) -> Option<Phase> {
        match self.phase {
            Phase::Waiting => {
                self.board.clear();
                self.answered.clear();
                self.roster.reset_scores();
                self.words.reset();
                self.drawer = None;
                self.word = None;
                self.send(Recipient::All, Message::Waiting);
                None
            }
            Phase::Starting => {
                if self.roster.len() < self.min_players {
                    return Some(Phase::Waiting);
                }
                self.answered.clear();
                self.word = None;
                let Some(drawer) = self.roster.next_drawer() else {
                    return Some(Phase::Waiting);
                };
                self.drawer = Some(drawer);
                self.send(Recipient::All, Message::Starting(drawer));
                self.arm();
                None
            }
            Phase::Picking => {
                let Some(drawer) = self.drawer else {
                    return Some(Phase::Starting);
                };
                let Some(pair) = self.words.sample_pair() else {
                    info!(room_id = %self.room_id, "word pool exhausted, ending game");
                    return Some(Phase::Ending);
                };
                self.send(Recipient::All, Message::Picking);
                self.send(
                    Recipient::Player(drawer),
                    Message::Pick(Pick::Offer(pair.clone())),
                );
                self.offer = Some(pair);
                self.arm();
                None
            }
            Phase::Drawing => {
                self.board.clear();
                self.send(Recipient::All, Message::Drawing);
                self.arm();
                None
            }
            Phase::Ending => {
                self.send(Recipient::All, Message::Ending);
                self.arm();
                None
            }
            Phase::Closing => {
                self.close();
                None
            }
        }
    }

    /// Arms the current phase's timer, if it has one.
    fn arm(&mut self) {
        if let Some(after) = self.timings.for_phase(self.phase) {
            self.timer.arm(self.phase, after);
        }
    }

    pub(super) fn on_timeout(&mut self, phase: Phase) {
        if phase != self.phase {
            debug!(room_id = %self.room_id, %phase, current = %self.phase, "stale timeout ignored");
            return;
        }
        let next = match phase {
            Phase::Starting => Phase::Picking,
            Phase::Picking | Phase::Drawing => Phase::Starting,
            Phase::Ending => Phase::Waiting,
            Phase::Waiting | Phase::Closing => return,
        };
        debug!(room_id = %self.room_id, %phase, "phase timer expired");
        self.transition(next);
    }

    fn close(&mut self) {
        self.timer.cancel();
        // Dropping the players closes every outbound queue.
        drop(self.roster.drain());
        self.receiver.close();
        self.registry.delete(self.room_id);
        self.mirror(RecordOp::Delete);
        self.record = None;
        info!(room_id = %self.room_id, "room closed");
    }

    // -----------------------------------------------------------------
    // Player actions
    // -----------------------------------------------------------------

    pub(super) fn handle(&mut self, from: PlayerId, msg: Message) -> Handled {
        if !self.roster.contains(from) {
            return Err(GameError::PlayerNotFound(from));
        }

        match (self.phase, msg) {
            (Phase::Closing, msg) => Err(GameError::UnexpectedAction {
                action: msg.action(),
                phase: Phase::Closing,
            }),
            (_, Message::Chat(line)) => {
                self.chat(from, line.text);
                Ok(None)
            }
            (_, Message::Quit(_)) => self.remove(from),
            (_, Message::Kick(target)) => self.kick(from, target),
            (Phase::Waiting, Message::Start) => self.start(from),
            (Phase::Picking, Message::Pick(Pick::Word(word))) => self.pick(from, &word),
            (Phase::Drawing, Message::Guess(text)) => self.guess(from, &text),
            (_, msg) if msg.is_board_edit() => self.edit_board(from, msg),
            (phase, msg) => Err(GameError::UnexpectedAction {
                action: msg.action(),
                phase,
            }),
        }
    }

    fn chat(&self, from: PlayerId, text: String) {
        self.send(
            Recipient::All,
            Message::Chat(ChatLine {
                from: Some(from),
                text,
            }),
        );
    }

    fn start(&mut self, from: PlayerId) -> Handled {
        if from != self.owner {
            return Err(GameError::NotOwner(from));
        }
        if self.roster.len() < self.min_players {
            return Err(GameError::NotEnoughPlayers {
                have: self.roster.len(),
                need: self.min_players,
            });
        }
        info!(room_id = %self.room_id, players = self.roster.len(), "game started");
        Ok(Some(Phase::Starting))
    }

    fn kick(&mut self, from: PlayerId, target: PlayerId) -> Handled {
        if from != self.owner {
            return Err(GameError::NotOwner(from));
        }
        if target == from {
            return Err(GameError::CannotKickSelf);
        }
        if !self.roster.contains(target) {
            return Err(GameError::PlayerNotFound(target));
        }

        self.banned.insert(target);
        self.mirror(RecordOp::Banned(target));
        info!(room_id = %self.room_id, player_id = %target, "player kicked");
        self.send(Recipient::All, Message::Kick(target));
        self.remove(target)
    }

    fn pick(&mut self, from: PlayerId, word: &str) -> Handled {
        if self.drawer != Some(from) {
            return Err(GameError::NotYourTurn(from));
        }
        let word = word.trim().to_lowercase();
        let offered = self
            .offer
            .as_ref()
            .is_some_and(|pair| pair.contains(&word));
        if !offered {
            return Err(GameError::InvalidWord(word));
        }

        self.words.take(&word);
        self.word = Some(word);
        Ok(Some(Phase::Drawing))
    }

    fn edit_board(&mut self, from: PlayerId, msg: Message) -> Handled {
        if self.phase != Phase::Drawing || self.drawer != Some(from) {
            return Err(GameError::NotYourTurn(from));
        }
        if matches!(msg, Message::ClearBoard) {
            self.board.clear();
        }
        self.board.push(msg.clone());
        self.send(Recipient::AllExcept(from), msg);
        Ok(None)
    }

    fn guess(&mut self, from: PlayerId, text: &str) -> Handled {
        if self.drawer == Some(from) {
            return Err(GameError::NotYourTurn(from));
        }
        if self.answered.contains(&from) {
            return Err(GameError::AlreadyAnswered(from));
        }
        let Some(word) = self.word.as_deref() else {
            return Err(GameError::UnexpectedAction {
                action: Action::Guess,
                phase: self.phase,
            });
        };

        if text.trim().to_lowercase() != word {
            // Wrong guesses are just chat.
            self.chat(from, text.to_string());
            return Ok(None);
        }

        let first = self.answered.is_empty();
        let award = guess_award(self.answered.len());
        self.answered.insert(from);
        info!(room_id = %self.room_id, player_id = %from, award, "correct guess");

        self.send(Recipient::All, Message::CorrectGuess(from));
        let guesser_score = self.award(from, award);
        let drawer = self.drawer;
        let mut drawer_score = 0;
        if first {
            if let Some(drawer) = drawer {
                drawer_score = self.award(drawer, DRAWER_BONUS);
            }
        }

        if guesser_score >= self.target_score || drawer_score >= self.target_score {
            info!(room_id = %self.room_id, "target score reached");
            return Ok(Some(Phase::Ending));
        }

        if self.all_answered() {
            return Ok(Some(self.complete_round()));
        }
        Ok(None)
    }

    /// Pays the drawer for a round everyone guessed and picks what follows.
    pub(super) fn complete_round(&mut self) -> Phase {
        let drawer_score = self
            .drawer
            .map(|d| self.award(d, ROUND_COMPLETE_BONUS))
            .unwrap_or(0);
        if drawer_score >= self.target_score {
            info!(room_id = %self.room_id, "target score reached");
            return Phase::Ending;
        }
        Phase::Starting
    }

    /// Adds points to a player, announces the new score, and returns it.
    fn award(&mut self, player_id: PlayerId, points: u32) -> u32 {
        let Some(player) = self.roster.get_mut(player_id) else {
            return 0;
        };
        let score = player.award(points);
        self.send(
            Recipient::All,
            Message::UpdateScore(ScoreUpdate {
                id: player_id,
                score,
            }),
        );
        score
    }

    /// Whether every player except the drawer has guessed the word.
    pub(super) fn all_answered(&self) -> bool {
        let drawer = self.drawer;
        self.roster
            .ids()
            .filter(|id| Some(*id) != drawer)
            .all(|id| self.answered.contains(&id))
    }
}
