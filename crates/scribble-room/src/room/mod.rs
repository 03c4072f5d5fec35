//! Room actor: an isolated Tokio task that owns one game.
//!
//! Each room runs in its own task, communicating with the outside world
//! through a bounded mpsc mailbox. This is the "actor model": the task is
//! the only thing that ever reads or writes game state, so none of it
//! needs a lock.
//!
//! The phase state machine lives in [`phase`]; this module holds the
//! mailbox plumbing, admission and removal, and fan-out.

mod phase;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use scribble_protocol::{Message, Phase, PlayerEntry, PlayerId, Recipient, RoomId, Snapshot};
use scribble_timer::{Expired, PhaseTimer};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::roster::Roster;
use crate::store::{RecordMirror, RecordOp};
use crate::words::{Dictionary, WordPool};
use crate::{GameError, PhaseTimings, Player, RoomConfig, RoomError, RoomRegistry, RoomSettings};

/// Outcome of a successful admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The player was seated and greeted.
    Joined,
    /// The player was already seated. Nothing changed, and the `Player`
    /// passed in was dropped.
    AlreadyPresent,
}

/// Commands sent to a room actor through its mailbox.
///
/// The `oneshot::Sender` in some variants is a "reply channel": the
/// caller sends a command and waits for the response on that channel.
pub(crate) enum RoomCommand {
    /// Seat a new player.
    Admit {
        player: Player,
        reply: oneshot::Sender<Result<Admission, RoomError>>,
    },

    /// A message from a seated player, stamped with their id.
    Submit { from: PlayerId, msg: Message },

    /// Jump to a phase, running the usual exit and entry actions.
    Force { phase: Phase },

    /// Request a snapshot of room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },
}

/// A snapshot of room metadata, for listings and tests.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: Phase,
    pub owner: PlayerId,
    pub drawer: Option<PlayerId>,
    /// Seated players in turn order.
    pub players: Vec<PlayerEntry>,
    pub max_players: usize,
    /// Words left in the working pool.
    pub words_left: usize,
    /// Phase that owns the pending timer, if one is armed.
    pub timer: Option<Phase>,
    /// Time until that timer fires.
    pub timer_left: Option<Duration>,
}

impl RoomInfo {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Score of a seated player.
    pub fn score(&self, player_id: PlayerId) -> Option<u32> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.score)
    }
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. Every operation
/// fails with [`RoomError::Unavailable`] once the room has closed.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's unique ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Whether the room's mailbox has closed.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Asks the room to seat a player.
    ///
    /// Idempotent: admitting an id that is already seated returns
    /// [`Admission::AlreadyPresent`] and changes nothing.
    ///
    /// # Errors
    /// - [`RoomError::RoomFull`]: no free seat
    /// - [`RoomError::Banned`]: the player was kicked earlier
    /// - [`RoomError::Unavailable`]: the room is closing or gone
    pub async fn admit(&self, player: Player) -> Result<Admission, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Admit { player, reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Delivers a player's message (fire-and-forget).
    ///
    /// Waits only while the mailbox is full.
    pub async fn submit(&self, from: PlayerId, msg: Message) -> Result<(), RoomError> {
        self.send(RoomCommand::Submit { from, msg }).await
    }

    /// Forces a phase transition. Forcing [`Phase::Closing`] shuts the
    /// room down.
    pub async fn force(&self, phase: Phase) -> Result<(), RoomError> {
        self.send(RoomCommand::Force { phase }).await
    }

    /// Requests the current room info.
    ///
    /// The reply comes after every command sent earlier through this
    /// handle has been processed.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// A handle wired to a bare channel instead of an actor.
    #[cfg(test)]
    pub(crate) fn detached(room_id: RoomId) -> (Self, mpsc::Receiver<RoomCommand>) {
        let (sender, rx) = mpsc::channel(1);
        (Self { room_id, sender }, rx)
    }
}

/// One event picked by the actor loop.
enum Event {
    Command(Option<RoomCommand>),
    Timeout(Expired<Phase>),
}

/// The internal room actor state. Runs inside a Tokio task.
struct Game {
    room_id: RoomId,
    owner: PlayerId,
    target_score: u32,
    max_players: usize,
    min_players: usize,
    timings: PhaseTimings,

    phase: Phase,
    roster: Roster,
    words: WordPool,
    drawer: Option<PlayerId>,
    /// The secret word, once the drawer has picked.
    word: Option<String>,
    /// The pair offered to the drawer during Picking.
    offer: Option<[String; 2]>,
    /// Accepted board edits of the current round, replayed to late joiners.
    board: Vec<Message>,
    /// Players who guessed the word this round.
    answered: HashSet<PlayerId>,
    banned: HashSet<PlayerId>,

    timer: PhaseTimer<Phase>,
    receiver: mpsc::Receiver<RoomCommand>,
    registry: Arc<RoomRegistry>,
    /// Dropped on close so the mirror task can finish.
    record: Option<RecordMirror>,
}

impl Game {
    /// Runs the actor loop until the room closes.
    async fn run(mut self) {
        info!(
            room_id = %self.room_id,
            owner = %self.owner,
            words = self.words.len(),
            "room actor started"
        );

        while !self.phase.is_terminal() {
            // Resolve the event first so the handlers below get `&mut self`.
            let event = tokio::select! {
                cmd = self.receiver.recv() => Event::Command(cmd),
                expired = self.timer.expired() => Event::Timeout(expired),
            };
            match event {
                Event::Command(Some(cmd)) => self.handle_command(cmd),
                Event::Command(None) => {
                    // Every handle is gone; nobody can reach this room.
                    self.transition(Phase::Closing);
                }
                Event::Timeout(expired) => {
                    debug!(
                        room_id = %self.room_id,
                        phase = %expired.phase,
                        late_ms = expired.late_by.as_millis() as u64,
                        "phase timed out"
                    );
                    self.on_timeout(expired.phase);
                }
            }
        }

        info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Admit { player, reply } => {
                let result = self.admit(player);
                let _ = reply.send(result);
            }
            RoomCommand::Submit { from, msg } => self.submit(from, msg),
            RoomCommand::Force { phase } => {
                info!(room_id = %self.room_id, from = %self.phase, to = %phase, "forced transition");
                self.transition(phase);
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
        }
    }

    /// Routes a player message through the current phase. Rejections are
    /// logged and dropped; the sender gets no reply.
    fn submit(&mut self, from: PlayerId, msg: Message) {
        let action = msg.action();
        match self.handle(from, msg) {
            Ok(Some(next)) => self.transition(next),
            Ok(None) => {}
            Err(e) => debug!(
                room_id = %self.room_id,
                player_id = %from,
                %action,
                phase = %self.phase,
                error = %e,
                "action rejected"
            ),
        }
    }

    fn admit(&mut self, player: Player) -> Result<Admission, RoomError> {
        let player_id = player.id();
        if self.roster.contains(player_id) {
            debug!(room_id = %self.room_id, %player_id, "already seated");
            return Ok(Admission::AlreadyPresent);
        }
        if self.banned.contains(&player_id) {
            return Err(RoomError::Banned(player_id, self.room_id));
        }
        if self.roster.len() >= self.max_players {
            return Err(RoomError::RoomFull(self.room_id));
        }

        let entry = player.entry();
        self.roster.insert(player);
        self.send(Recipient::Player(player_id), Message::Greet(self.snapshot()));
        self.send(Recipient::AllExcept(player_id), Message::Join(entry));
        self.mirror(RecordOp::Joined(player_id));

        info!(
            room_id = %self.room_id,
            %player_id,
            players = self.roster.len(),
            "player joined"
        );
        Ok(Admission::Joined)
    }

    /// Takes a player out of the game (quit, kick, or lost connection)
    /// and returns the transition that follows, if any.
    fn remove(&mut self, player_id: PlayerId) -> Result<Option<Phase>, GameError> {
        // Dropping the player closes its outbound queue.
        self.roster
            .remove(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        // Departed players stay in `answered` until the round ends.
        self.mirror(RecordOp::Left(player_id));
        info!(
            room_id = %self.room_id,
            %player_id,
            players = self.roster.len(),
            "player left"
        );

        if self.roster.is_empty() {
            return Ok(Some(Phase::Closing));
        }

        self.send(Recipient::All, Message::Quit(player_id));

        if player_id == self.owner {
            if let Some(next) = self.roster.first() {
                self.owner = next;
                info!(room_id = %self.room_id, owner = %next, "ownership passed on");
                self.send(Recipient::All, Message::NewOwner(next));
            }
        }

        let was_drawer = self.drawer == Some(player_id);
        if was_drawer {
            self.drawer = None;
        }

        if self.roster.len() == 1 {
            return Ok((self.phase != Phase::Waiting).then_some(Phase::Waiting));
        }
        if was_drawer && matches!(self.phase, Phase::Starting | Phase::Picking | Phase::Drawing) {
            return Ok(Some(Phase::Starting));
        }
        if self.phase == Phase::Drawing && self.all_answered() {
            info!(room_id = %self.room_id, "everyone left has guessed");
            return Ok(Some(self.complete_round()));
        }
        Ok(None)
    }

    /// Fans a message out to its recipients. Messages to players whose
    /// pump is gone are dropped.
    fn send(&self, to: Recipient, msg: Message) {
        match to {
            Recipient::All => {
                for player in self.roster.iter() {
                    player.send(msg.clone());
                }
            }
            Recipient::Player(id) => {
                if let Some(player) = self.roster.get(id) {
                    player.send(msg);
                }
            }
            Recipient::AllExcept(excluded) => {
                for player in self.roster.iter().filter(|p| p.id() != excluded) {
                    player.send(msg.clone());
                }
            }
        }
    }

    fn mirror(&self, op: RecordOp) {
        if let Some(record) = &self.record {
            record.send(op);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            owner: self.owner,
            drawer: self.drawer,
            players: self.roster.entries(),
            board: self.board.clone(),
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            phase: self.phase,
            owner: self.owner,
            drawer: self.drawer,
            players: self.roster.entries(),
            max_players: self.max_players,
            words_left: self.words.len(),
            timer: self.timer.armed_for(),
            timer_left: self.timer.remaining(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// The room starts in [`Phase::Waiting`] with nobody seated. It
/// deregisters itself from `registry` when it closes.
pub(crate) fn spawn_room(
    room_id: RoomId,
    settings: RoomSettings,
    config: &RoomConfig,
    registry: Arc<RoomRegistry>,
    record: RecordMirror,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_size.max(1));

    let game = Game {
        room_id,
        owner: settings.owner,
        target_score: settings.target_score,
        max_players: settings.max_players,
        min_players: config.min_players,
        timings: config.timings,
        phase: Phase::Waiting,
        roster: Roster::new(),
        words: WordPool::new(Dictionary::from_words(&settings.words)),
        drawer: None,
        word: None,
        offer: None,
        board: Vec::new(),
        answered: HashSet::new(),
        banned: HashSet::new(),
        timer: PhaseTimer::new(),
        receiver: rx,
        registry,
        record: Some(record),
    };

    tokio::spawn(game.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
