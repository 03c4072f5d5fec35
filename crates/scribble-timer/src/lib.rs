//! Single-slot phase timer for Scribble rooms.
//!
//! Every timed phase (Starting, Picking, Drawing, Ending) arms one deadline
//! on entry and cancels it on exit. A room owns exactly one [`PhaseTimer`],
//! so arming replaces whatever was pending: a stale deadline from an old
//! phase can never fire into a newer one.
//!
//! # Integration
//!
//! The timer is designed to sit inside a room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         expired = timer.expired() => {
//!             self.on_timeout(expired.phase);
//!         }
//!     }
//! }
//! ```
//!
//! When nothing is armed, [`PhaseTimer::expired`] pends forever, so the
//! `select!` simply keeps serving the mailbox.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Handed back by [`PhaseTimer::expired`] when a deadline fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired<T> {
    /// Whatever the caller attached when arming, usually the phase that
    /// owns the deadline.
    pub phase: T,
    /// How late the wake-up was relative to the deadline.
    pub late_by: Duration,
}

/// A cancellable, re-armable deadline with at most one pending slot.
///
/// Generic over a small tag (`T`) recording who armed it. The room uses
/// its phase enum, tests use plain integers.
#[derive(Debug)]
pub struct PhaseTimer<T> {
    slot: Option<(Instant, T)>,
}

impl<T> Default for PhaseTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PhaseTimer<T> {
    /// Create a disarmed timer.
    pub fn new() -> Self {
        Self { slot: None }
    }
}

impl<T: Copy + std::fmt::Debug> PhaseTimer<T> {
    /// Arm the timer to fire `after` from now, tagged with `phase`.
    ///
    /// Any previously pending deadline is discarded.
    pub fn arm(&mut self, phase: T, after: Duration) {
        if let Some((_, old)) = self.slot.take() {
            debug!(?old, new = ?phase, "re-arming phase timer over a pending deadline");
        }
        trace!(?phase, after_ms = after.as_millis() as u64, "phase timer armed");
        self.slot = Some((Instant::now() + after, phase));
    }

    /// Cancel the pending deadline. Returns `true` if one was pending.
    ///
    /// Safe to call multiple times (idempotent).
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some((_, phase)) => {
                trace!(?phase, "phase timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// The tag of the pending deadline, if any.
    pub fn armed_for(&self) -> Option<T> {
        self.slot.map(|(_, phase)| phase)
    }

    /// Time left until the pending deadline fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.slot
            .map(|(deadline, _)| deadline.saturating_duration_since(Instant::now()))
    }

    /// Wait until the pending deadline is due, then disarm and report it.
    ///
    /// With nothing armed, this future pends forever. It is cancel-safe:
    /// dropping it (for example because another `select!` branch won)
    /// leaves the deadline armed.
    pub async fn expired(&mut self) -> Expired<T> {
        let Some((deadline, phase)) = self.slot else {
            // Never completes; select! serves the other branches.
            return std::future::pending().await;
        };

        time::sleep_until(deadline).await;

        let now = Instant::now();
        self.slot = None;
        let late_by = now.saturating_duration_since(deadline);
        trace!(?phase, late_ms = late_by.as_millis() as u64, "phase timer fired");

        Expired { phase, late_by }
    }
}
