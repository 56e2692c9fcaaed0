//! Events published by running matches

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use tetromatch_core::BoardSnapshot;
use tetromatch_core::types::TerminationReason;

use crate::registry::MatchId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    /// The start delay elapsed and the first piece spawned
    Started { id: MatchId, player: String },
    /// Any visible mutation: move, rotate, drop, lock, garbage, hold
    BoardChanged {
        id: MatchId,
        snapshot: Box<BoardSnapshot>,
        score: u32,
    },
    /// Emitted exactly once per match
    Terminated {
        id: MatchId,
        final_score: u32,
        reason: TerminationReason,
    },
    /// Outcome of a paired game; the first side to finish loses
    PairCompleted {
        pair_id: String,
        winner: String,
        loser: String,
    },
}

impl MatchEvent {
    /// The match this event belongs to, if it belongs to a single one
    pub fn match_id(&self) -> Option<MatchId> {
        match self {
            Self::Started { id, .. }
            | Self::BoardChanged { id, .. }
            | Self::Terminated { id, .. } => Some(*id),
            Self::PairCompleted { .. } => None,
        }
    }
}

/// Where match events go
///
/// Publishing must not block: it is called from inside the match task.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: MatchEvent);
}

impl EventSink for UnboundedSender<MatchEvent> {
    fn publish(&self, event: MatchEvent) {
        if self.send(event).is_err() {
            log::trace!("[events] no receiver, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_serializes_with_kind_tag() {
        let event = MatchEvent::Terminated {
            id: MatchId::new(3),
            final_score: 140,
            reason: TerminationReason::TopOut,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "terminated");
        assert_eq!(json["id"], 3);
        assert_eq!(json["reason"], "top-out");
        assert_eq!(event.match_id(), Some(MatchId::new(3)));
    }

    #[test]
    fn unbounded_sender_is_a_sink() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<MatchEvent>();
        tx.publish(MatchEvent::PairCompleted {
            pair_id: "p".to_string(),
            winner: "bob".to_string(),
            loser: "alice".to_string(),
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.match_id(), None);
    }
}
