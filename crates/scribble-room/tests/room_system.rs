//! Integration tests for game rooms, driven on a paused clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scribble_protocol::{ChatLine, Message, Phase, Pick, PlayerId, ScoreUpdate};
use scribble_room::{
    Admission, MemoryRoomStore, Player, RoomConfig, RoomError, RoomHandle, RoomInfo, RoomManager,
    RoomRegistry, RoomSettings, RoomStore,
};
use tokio::sync::mpsc::UnboundedReceiver;

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);
const P3: PlayerId = PlayerId(3);
const P4: PlayerId = PlayerId(4);

/// Just past a phase deadline.
fn past(secs: u64) -> Duration {
    Duration::from_secs(secs) + Duration::from_millis(10)
}

// =========================================================================
// Test table: one room plus the inbox of every seated player.
// =========================================================================

struct Table {
    manager: RoomManager<MemoryRoomStore>,
    room: RoomHandle,
    inboxes: HashMap<PlayerId, UnboundedReceiver<Message>>,
}

impl Table {
    /// Creates a room owned by P1 and seats `seats` in order.
    async fn new(settings: RoomSettings, seats: &[PlayerId]) -> Self {
        let manager = RoomManager::new(
            RoomConfig::default(),
            Arc::new(RoomRegistry::new()),
            Arc::new(MemoryRoomStore::new()),
        );
        let room = manager.create_room(settings).await;
        let mut table = Self {
            manager,
            room,
            inboxes: HashMap::new(),
        };
        for id in seats {
            assert_eq!(table.seat(*id).await.unwrap(), Admission::Joined);
        }
        table.drain_all();
        table
    }

    async fn seat(&mut self, id: PlayerId) -> Result<Admission, RoomError> {
        let (player, rx) = Player::channel(id, format!("player-{}", id.0));
        let admission = self.room.admit(player).await?;
        if admission == Admission::Joined {
            self.inboxes.insert(id, rx);
        }
        Ok(admission)
    }

    /// Submits a message and waits until the room has processed it.
    async fn send(&self, from: PlayerId, msg: Message) {
        self.room.submit(from, msg).await.unwrap();
        let _ = self.room.info().await;
    }

    async fn info(&self) -> RoomInfo {
        self.room.info().await.unwrap()
    }

    /// Everything queued for `id` so far.
    fn inbox(&mut self, id: PlayerId) -> Vec<Message> {
        let rx = self.inboxes.get_mut(&id).unwrap();
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn drain_all(&mut self) {
        let ids: Vec<_> = self.inboxes.keys().copied().collect();
        for id in ids {
            self.inbox(id);
        }
    }

    /// Starts the game as P1, lets the Starting timer run out, and has the
    /// drawer pick the first offered word. Returns the drawer and the word.
    async fn to_drawing(&mut self) -> (PlayerId, String) {
        self.send(P1, Message::Start).await;
        tokio::time::sleep(past(5)).await;

        let info = self.info().await;
        assert_eq!(info.phase, Phase::Picking);
        let drawer = info.drawer.unwrap();
        let [word, _] = offer(&self.inbox(drawer)).unwrap();

        self.send(drawer, Message::Pick(Pick::Word(word.clone()))).await;
        assert_eq!(self.info().await.phase, Phase::Drawing);
        self.drain_all();
        (drawer, word)
    }
}

fn offer(msgs: &[Message]) -> Option<[String; 2]> {
    msgs.iter().find_map(|m| match m {
        Message::Pick(Pick::Offer(pair)) => Some(pair.clone()),
        _ => None,
    })
}

fn score(id: PlayerId, score: u32) -> Message {
    Message::UpdateScore(ScoreUpdate { id, score })
}

// =========================================================================
// A full round
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_full_round_with_two_players() {
    let settings = RoomSettings::new(P1, ["cat", "dog"]).with_target_score(20);
    let mut t = Table::new(settings, &[P1, P2]).await;

    t.send(P1, Message::Start).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P1));
    assert_eq!(info.timer, Some(Phase::Starting));
    let left = info.timer_left.unwrap();
    assert!(left > Duration::ZERO && left <= Duration::from_secs(5));
    assert_eq!(t.inbox(P2), [Message::Starting(P1)]);

    tokio::time::sleep(past(5)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Picking);
    assert_eq!(info.timer, Some(Phase::Picking));

    // Only the drawer sees the offer.
    let mut pair = offer(&t.inbox(P1)).unwrap();
    pair.sort();
    assert_eq!(pair, ["cat", "dog"]);
    assert_eq!(t.inbox(P2), [Message::Picking]);

    t.send(P1, Message::Pick(Pick::Word("Cat".into()))).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Drawing);
    assert_eq!(info.words_left, 1);
    assert_eq!(info.timer, Some(Phase::Drawing));
    t.drain_all();

    t.send(P2, Message::Guess("cat".into())).await;
    assert_eq!(
        t.inbox(P2),
        [
            Message::CorrectGuess(P2),
            score(P2, 10),
            score(P1, 10),
            score(P1, 11),
            Message::Starting(P2),
        ]
    );

    let info = t.info().await;
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P2));
    assert_eq!(info.score(P1), Some(11));
    assert_eq!(info.score(P2), Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_successive_guessers_score_less() {
    let settings = RoomSettings::new(P1, ["cat", "dog", "owl"]);
    let mut t = Table::new(settings, &[P1, P2, P3]).await;
    let (drawer, word) = t.to_drawing().await;
    assert_eq!(drawer, P1);

    t.send(P2, Message::Guess(word.to_uppercase())).await;
    // A second correct guess from the same player scores nothing.
    t.send(P2, Message::Guess(word.clone())).await;
    assert_eq!(t.info().await.score(P2), Some(10));
    assert_eq!(t.info().await.phase, Phase::Drawing);

    t.send(P3, Message::Guess("nope".into())).await;
    assert!(t.inbox(P1).contains(&Message::Chat(ChatLine {
        from: Some(P3),
        text: "nope".into(),
    })));

    t.send(P3, Message::Guess(word)).await;
    let info = t.info().await;
    assert_eq!(info.score(P3), Some(9));
    assert_eq!(info.score(P1), Some(11));
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P2));
}

#[tokio::test(start_paused = true)]
async fn test_rejoining_guesser_cannot_score_again() {
    let settings = RoomSettings::new(P1, ["cat", "dog", "owl"]);
    let mut t = Table::new(settings, &[P1, P2, P3, P4]).await;
    let (drawer, word) = t.to_drawing().await;
    assert_eq!(drawer, P1);

    t.send(P2, Message::Guess(word.clone())).await;
    t.send(P2, Message::Quit(P2)).await;
    assert_eq!(t.seat(P2).await.unwrap(), Admission::Joined);
    t.drain_all();

    t.send(P2, Message::Guess(word)).await;
    assert!(t.inbox(P3).is_empty());

    let info = t.info().await;
    assert_eq!(info.phase, Phase::Drawing);
    assert_eq!(info.score(P2), Some(0));
    assert_eq!(info.score(P1), Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_awards_keep_falling_after_first_guesser_leaves() {
    let settings = RoomSettings::new(P1, ["cat", "dog", "owl"]);
    let mut t = Table::new(settings, &[P1, P2, P3, P4]).await;
    let (_, word) = t.to_drawing().await;

    t.send(P2, Message::Guess(word.clone())).await;
    t.send(P2, Message::Quit(P2)).await;
    t.drain_all();

    t.send(P3, Message::Guess(word.clone())).await;
    // The drawer bonus was paid on the first guess only.
    assert_eq!(
        t.inbox(P4),
        [Message::CorrectGuess(P3), score(P3, 9)]
    );
    let info = t.info().await;
    assert_eq!(info.score(P1), Some(10));
    assert_eq!(info.phase, Phase::Drawing);

    t.send(P4, Message::Guess(word)).await;
    let info = t.info().await;
    assert_eq!(info.score(P4), Some(8));
    assert_eq!(info.score(P1), Some(11));
    assert_eq!(info.phase, Phase::Starting);
}

#[tokio::test(start_paused = true)]
async fn test_last_pending_guesser_leaving_ends_round() {
    let settings = RoomSettings::new(P1, ["cat", "dog", "owl"]);
    let mut t = Table::new(settings, &[P1, P2, P3]).await;
    let (_, word) = t.to_drawing().await;

    t.send(P2, Message::Guess(word)).await;
    t.drain_all();
    t.send(P3, Message::Quit(P3)).await;

    assert_eq!(
        t.inbox(P2),
        [Message::Quit(P3), score(P1, 11), Message::Starting(P2)]
    );
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P2));
    assert_eq!(info.score(P1), Some(11));
}

#[tokio::test(start_paused = true)]
async fn test_drawer_cannot_guess() {
    let settings = RoomSettings::new(P1, ["cat", "dog"]);
    let mut t = Table::new(settings, &[P1, P2]).await;
    let (drawer, word) = t.to_drawing().await;

    t.send(drawer, Message::Guess(word)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Drawing);
    assert_eq!(info.score(drawer), Some(0));
}

// =========================================================================
// Admission
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_admit_is_idempotent() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2]).await;

    let (again, mut rx) = Player::channel(P1, "imposter");
    assert_eq!(t.room.admit(again).await.unwrap(), Admission::AlreadyPresent);
    // The duplicate player was dropped along with its queue.
    assert!(rx.recv().await.is_none());

    let info = t.info().await;
    assert_eq!(info.player_count(), 2);
    assert!(t.inbox(P2).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_greet_and_join_on_admission() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1]).await;
    t.seat(P2).await.unwrap();

    let greeting = t.inbox(P2);
    let [Message::Greet(snapshot)] = greeting.as_slice() else {
        panic!("expected a single greet, got {greeting:?}");
    };
    assert_eq!(snapshot.phase, Phase::Waiting);
    assert_eq!(snapshot.owner, P1);
    assert_eq!(snapshot.players.len(), 2);

    let joined = t.inbox(P1);
    assert!(matches!(joined.as_slice(), [Message::Join(entry)] if entry.id == P2));
}

#[tokio::test(start_paused = true)]
async fn test_room_full() {
    let settings = RoomSettings::new(P1, ["cat"]).with_max_players(2);
    let mut t = Table::new(settings, &[P1, P2]).await;
    assert!(matches!(t.seat(P3).await, Err(RoomError::RoomFull(_))));
    assert_eq!(t.info().await.player_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_kicked_player_is_banned() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2, P3]).await;

    t.send(P1, Message::Kick(P2)).await;
    assert_eq!(t.inbox(P2), [Message::Kick(P2)]);
    assert!(t.inboxes.get_mut(&P2).unwrap().recv().await.is_none());
    assert_eq!(t.inbox(P3), [Message::Kick(P2), Message::Quit(P2)]);

    assert!(matches!(t.seat(P2).await, Err(RoomError::Banned(P2, _))));
    assert_eq!(t.info().await.player_count(), 2);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let record = t.manager.store().get(t.room.room_id()).await.unwrap();
    assert_eq!(record.banned_players, [P2]);
    assert_eq!(record.player_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_only_owner_kicks() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2, P3]).await;
    t.send(P2, Message::Kick(P3)).await;
    t.send(P1, Message::Kick(P1)).await;
    assert_eq!(t.info().await.player_count(), 3);
    assert!(t.inbox(P3).is_empty());
}

// =========================================================================
// Starting the game
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_only_owner_starts() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat", "dog"]), &[P1, P2]).await;
    t.send(P2, Message::Start).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.timer, None);
    assert!(t.inbox(P1).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_needs_two_players() {
    let t = Table::new(RoomSettings::new(P1, ["cat", "dog"]), &[P1]).await;
    t.send(P1, Message::Start).await;
    assert_eq!(t.info().await.phase, Phase::Waiting);
}

// =========================================================================
// Timers
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_picking_timeout_moves_to_next_drawer() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat", "dog"]), &[P1, P2]).await;
    t.send(P1, Message::Start).await;
    tokio::time::sleep(past(5)).await;
    assert_eq!(t.info().await.drawer, Some(P1));

    tokio::time::sleep(past(10)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P2));
    assert_eq!(info.timer, Some(Phase::Starting));
    assert_eq!(info.words_left, 2);
    assert!(t.inbox(P2).contains(&Message::Starting(P2)));
}

#[tokio::test(start_paused = true)]
async fn test_drawing_timeout_starts_next_round() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat", "dog"]), &[P1, P2]).await;
    t.to_drawing().await;

    tokio::time::sleep(past(59)).await;
    assert_eq!(t.info().await.phase, Phase::Drawing);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P2));
}

#[tokio::test(start_paused = true)]
async fn test_game_over_resets_on_return_to_waiting() {
    let settings = RoomSettings::new(P1, ["cat", "dog", "owl"]).with_target_score(10);
    let mut t = Table::new(settings, &[P1, P2]).await;
    let (_, word) = t.to_drawing().await;
    assert_eq!(t.info().await.words_left, 2);

    t.send(P2, Message::Guess(word)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Ending);
    assert_eq!(info.timer, Some(Phase::Ending));
    assert!(t.inbox(P2).ends_with(&[Message::Ending]));

    tokio::time::sleep(past(15)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.timer, None);
    assert_eq!(info.drawer, None);
    assert_eq!(info.words_left, 3);
    assert_eq!(info.score(P1), Some(0));
    assert_eq!(info.score(P2), Some(0));
    assert_eq!(t.inbox(P2), [Message::Waiting]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_pool_ends_game() {
    let settings = RoomSettings::new(P1, ["cat", "dog"]);
    let mut t = Table::new(settings, &[P1, P2]).await;
    t.to_drawing().await;

    // Drawing times out with one word left; Picking can't offer a pair.
    tokio::time::sleep(past(60)).await;
    tokio::time::sleep(past(5)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Ending);
    assert!(offer(&t.inbox(P2)).is_none());
}

// =========================================================================
// Picking
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_invalid_pick_is_ignored() {
    let settings = RoomSettings::new(P1, ["cat", "dog", "owl"]);
    let mut t = Table::new(settings, &[P1, P2]).await;
    t.send(P1, Message::Start).await;
    tokio::time::sleep(past(5)).await;
    let pair = offer(&t.inbox(P1)).unwrap();

    // In the dictionary but not offered.
    let unoffered = ["cat", "dog", "owl"]
        .into_iter()
        .find(|w| !pair.iter().any(|p| p == w))
        .unwrap();
    t.send(P1, Message::Pick(Pick::Word(unoffered.into()))).await;
    t.send(P1, Message::Pick(Pick::Word("zebra".into()))).await;
    // Offered, but not the drawer.
    t.send(P2, Message::Pick(Pick::Word(pair[0].clone()))).await;

    let info = t.info().await;
    assert_eq!(info.phase, Phase::Picking);
    assert_eq!(info.words_left, 3);
}

// =========================================================================
// Board
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_board_edits_relay_and_replay() {
    let settings = RoomSettings::new(P1, ["cat", "dog"]);
    let mut t = Table::new(settings, &[P1, P2]).await;
    let (drawer, _) = t.to_drawing().await;
    assert_eq!(drawer, P1);

    let stroke = Message::Draw(vec![0, 0, 10, 10]);
    let color = Message::ChangeColor("#ff0000".into());
    t.send(P1, stroke.clone()).await;
    t.send(P1, color.clone()).await;
    // Only the drawer draws.
    t.send(P2, Message::Draw(vec![5, 5, 6, 6])).await;

    assert_eq!(t.inbox(P2), [stroke.clone(), color.clone()]);
    assert!(t.inbox(P1).is_empty());

    t.seat(P3).await.unwrap();
    let greeting = t.inbox(P3);
    let [Message::Greet(snapshot)] = greeting.as_slice() else {
        panic!("expected a single greet, got {greeting:?}");
    };
    assert_eq!(snapshot.phase, Phase::Drawing);
    assert_eq!(snapshot.drawer, Some(P1));
    assert_eq!(snapshot.board, [stroke, color]);

    t.send(P1, Message::ClearBoard).await;
    t.seat(P4).await.unwrap();
    let greeting = t.inbox(P4);
    let [Message::Greet(snapshot)] = greeting.as_slice() else {
        panic!("expected a single greet, got {greeting:?}");
    };
    assert_eq!(snapshot.board, [Message::ClearBoard]);
}

#[tokio::test(start_paused = true)]
async fn test_board_edits_outside_drawing_are_ignored() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2]).await;
    t.send(P1, Message::Draw(vec![1, 2, 3, 4])).await;
    assert!(t.inbox(P2).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_chat_reaches_everyone() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2]).await;
    // The sender stamp comes from the room, not the client.
    t.send(
        P2,
        Message::Chat(ChatLine {
            from: Some(P1),
            text: "hi".into(),
        }),
    )
    .await;
    let expected = Message::Chat(ChatLine {
        from: Some(P2),
        text: "hi".into(),
    });
    assert_eq!(t.inbox(P1), [expected.clone()]);
    assert_eq!(t.inbox(P2), [expected]);
}

// =========================================================================
// Removal
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_last_two_players_fall_back_to_waiting() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat", "dog"]), &[P1, P2]).await;
    t.to_drawing().await;

    t.send(P2, Message::Quit(P2)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.timer, None);
    assert_eq!(info.player_count(), 1);
    assert_eq!(t.inbox(P1), [Message::Quit(P2), Message::Waiting]);
}

#[tokio::test(start_paused = true)]
async fn test_owner_leaves_mid_drawing() {
    let settings = RoomSettings::new(P1, ["cat", "dog"]);
    let mut t = Table::new(settings, &[P2, P1, P3, P4]).await;
    let (drawer, _) = t.to_drawing().await;
    assert_eq!(drawer, P2);

    t.send(P1, Message::Quit(P1)).await;
    let info = t.info().await;
    assert_eq!(info.owner, P3);
    assert_eq!(info.phase, Phase::Drawing);
    assert_eq!(info.drawer, Some(P2));
    assert_eq!(info.timer, Some(Phase::Drawing));
    assert_eq!(t.inbox(P4), [Message::Quit(P1), Message::NewOwner(P3)]);
}

#[tokio::test(start_paused = true)]
async fn test_drawer_leaving_starts_next_round() {
    let settings = RoomSettings::new(P1, ["cat", "dog"]);
    let mut t = Table::new(settings, &[P2, P1, P3]).await;
    let (drawer, _) = t.to_drawing().await;
    assert_eq!(drawer, P2);

    t.send(P2, Message::Quit(P2)).await;
    let info = t.info().await;
    assert_eq!(info.phase, Phase::Starting);
    assert_eq!(info.drawer, Some(P1));
    assert_eq!(info.timer, Some(Phase::Starting));
    assert_eq!(info.owner, P1);
    assert_eq!(t.inbox(P3), [Message::Quit(P2), Message::Starting(P1)]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_room_closes() {
    let t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2]).await;
    let room_id = t.room.room_id();

    t.room.submit(P1, Message::Quit(P1)).await.unwrap();
    t.room.submit(P2, Message::Quit(P2)).await.unwrap();
    assert!(matches!(
        t.room.info().await,
        Err(RoomError::Unavailable(_))
    ));
    assert_eq!(t.manager.room_count(), 0);
    assert!(matches!(
        t.manager.admit(room_id, Player::channel(P3, "late").0).await,
        Err(RoomError::NotFound(_))
    ));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(t.manager.store().get(room_id).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_forced_close_drops_every_player() {
    let mut t = Table::new(RoomSettings::new(P1, ["cat"]), &[P1, P2]).await;
    t.room.force(Phase::Closing).await.unwrap();
    for id in [P1, P2] {
        assert!(t.inboxes.get_mut(&id).unwrap().recv().await.is_none());
    }
    assert!(t.room.info().await.is_err());
    assert_eq!(t.manager.room_count(), 0);
}
