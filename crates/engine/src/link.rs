//! Pairing link - couples the two matches of a head-to-head game
//!
//! The link never touches either match directly. It holds weak senders to both match
//! queues, relays garbage between them, and decides the outcome with one compare-and-set
//! on `first_finisher`: the side that wins the CAS finished first and loses the game.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::WeakUnboundedSender;

use crate::event::{EventSink, MatchEvent};
use crate::runtime::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    fn code(self) -> u8 {
        self.index() as u8 + 1
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Side::A),
            2 => Some(Side::B),
            _ => None,
        }
    }
}

const NO_FINISHER: u8 = 0;

pub struct PairingLink {
    pair_id: String,
    players: [String; 2],
    peers: [WeakUnboundedSender<Command>; 2],
    first_finisher: AtomicU8,
    ended: AtomicU8,
    sink: Arc<dyn EventSink>,
}

impl PairingLink {
    pub fn new(
        pair_id: impl Into<String>,
        players: [String; 2],
        peers: [WeakUnboundedSender<Command>; 2],
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            pair_id: pair_id.into(),
            players,
            peers,
            first_finisher: AtomicU8::new(NO_FINISHER),
            ended: AtomicU8::new(0),
            sink,
        }
    }

    pub fn pair_id(&self) -> &str {
        &self.pair_id
    }

    pub fn player(&self, side: Side) -> &str {
        &self.players[side.index()]
    }

    /// Send `rows` garbage rows to the side opposite `from`
    pub fn forward_garbage(&self, from: Side, rows: u32) {
        if rows == 0 {
            return;
        }
        log::debug!(
            "[pair {}] {} rows of garbage {:?} -> {:?}",
            self.pair_id,
            rows,
            from,
            from.other()
        );
        self.send(from.other(), Command::Garbage(rows));
    }

    /// Record that `side` has ended
    ///
    /// Returns true if this call decided the game, i.e. `side` finished first. Exactly one
    /// call per link returns true, whatever the interleaving.
    pub fn report_finished(&self, side: Side) -> bool {
        self.ended.fetch_add(1, Ordering::AcqRel);

        let decided = self
            .first_finisher
            .compare_exchange(NO_FINISHER, side.code(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !decided {
            return false;
        }

        let loser = self.player(side).to_string();
        let winner = self.player(side.other()).to_string();
        log::info!(
            "[pair {}] {} finished first, {} wins",
            self.pair_id,
            loser,
            winner
        );
        self.sink.publish(MatchEvent::PairCompleted {
            pair_id: self.pair_id.clone(),
            winner,
            loser,
        });
        self.send(side.other(), Command::OpponentFinished);
        true
    }

    pub fn first_finisher(&self) -> Option<Side> {
        Side::from_code(self.first_finisher.load(Ordering::Acquire))
    }

    /// Both sides have ended
    pub fn settled(&self) -> bool {
        self.ended.load(Ordering::Acquire) >= 2
    }

    fn send(&self, to: Side, command: Command) {
        let delivered = self.peers[to.index()]
            .upgrade()
            .is_some_and(|tx| tx.send(command).is_ok());
        if !delivered {
            log::warn!(
                "[pair {}] side {:?} ({}) is gone, message dropped",
                self.pair_id,
                to,
                self.player(to)
            );
        }
    }
}

impl std::fmt::Debug for PairingLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairingLink")
            .field("pair_id", &self.pair_id)
            .field("players", &self.players)
            .field("first_finisher", &self.first_finisher())
            .field("settled", &self.settled())
            .finish()
    }
}
