//! The players of one game and the order they draw in.

use std::collections::{HashMap, VecDeque};

use scribble_protocol::{PlayerEntry, PlayerId};

use crate::Player;

/// Players keyed by id, plus the turn queue.
///
/// Every insert and remove updates both sides, so the map and the queue
/// always hold the same set of players.
#[derive(Debug, Default)]
pub(crate) struct Roster {
    players: HashMap<PlayerId, Player>,
    /// Front is the next drawer.
    turns: VecDeque<PlayerId>,
}

impl Roster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seats a player at the back of the turn queue. Returns `false` (and
    /// changes nothing) if the id is already seated.
    pub(crate) fn insert(&mut self, player: Player) -> bool {
        let id = player.id();
        if self.players.contains_key(&id) {
            return false;
        }
        self.players.insert(id, player);
        self.turns.push_back(id);
        true
    }

    pub(crate) fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.turns.retain(|p| *p != id);
        Some(player)
    }

    /// Empties the roster, handing back every player.
    pub(crate) fn drain(&mut self) -> Vec<Player> {
        self.turns.clear();
        self.players.drain().map(|(_, p)| p).collect()
    }

    /// Pops the front of the turn queue and re-appends it at the back.
    pub(crate) fn next_drawer(&mut self) -> Option<PlayerId> {
        let id = self.turns.pop_front()?;
        self.turns.push_back(id);
        Some(id)
    }

    /// The player at the front of the turn queue.
    pub(crate) fn first(&self) -> Option<PlayerId> {
        self.turns.front().copied()
    }

    pub(crate) fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.players.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in turn order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Player> {
        self.turns.iter().filter_map(|id| self.players.get(id))
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.turns.iter().copied()
    }

    pub(crate) fn entries(&self) -> Vec<PlayerEntry> {
        self.iter().map(Player::entry).collect()
    }

    pub(crate) fn reset_scores(&mut self) {
        for player in self.players.values_mut() {
            player.reset_score();
        }
    }
}
