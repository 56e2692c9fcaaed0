//! Action dispatcher - routes player input to the owning match task
//!
//! Each match task drains a single queue, so actions on one match are applied one at a
//! time in arrival order while different matches proceed in parallel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use tetromatch_core::types::MatchAction;

use crate::error::EngineError;
use crate::registry::{MatchId, Registry};
use crate::runtime::Command;

/// Why an action was accepted but not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreReason {
    /// The match is not active (pending start or ended)
    IllegalTransition,
    /// The player does not own this match
    NotPermitted,
}

/// How a submitted action resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionOutcome {
    Applied,
    /// Legal, but nothing moved (blocked shift, failed rotation, second hold)
    Unchanged,
    Ignored(IgnoreReason),
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Unchanged => "unchanged",
            Self::Ignored(IgnoreReason::IllegalTransition) => "illegal-transition",
            Self::Ignored(IgnoreReason::NotPermitted) => "not-permitted",
        }
    }
}

/// Parse an external action id
///
/// ```
/// use tetromatch_engine::{parse_action, EngineError};
/// use tetromatch_engine::types::MatchAction;
///
/// assert_eq!(parse_action("hard-drop"), Ok(MatchAction::HardDrop));
/// assert_eq!(parse_action("stop"), Ok(MatchAction::Forfeit));
/// assert!(matches!(parse_action("jump"), Err(EngineError::InvalidAction(_))));
/// ```
pub fn parse_action(raw: &str) -> Result<MatchAction, EngineError> {
    MatchAction::from_str(raw).ok_or_else(|| EngineError::InvalidAction(raw.to_string()))
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Queue `action` on match `id` and wait until the match has handled it
    pub async fn submit(
        &self,
        id: MatchId,
        player: &str,
        action: MatchAction,
    ) -> Result<ActionOutcome, EngineError> {
        let tx = self.registry.sender(id).await?;
        let (reply, outcome) = oneshot::channel();

        tx.send(Command::Action {
            player: player.to_string(),
            action,
            reply,
        })
        .map_err(|_| EngineError::UnknownMatch(id))?;

        // The task drops the reply only when it has already shut down.
        outcome.await.map_err(|_| EngineError::UnknownMatch(id))
    }

    /// Parse then submit
    pub async fn submit_raw(
        &self,
        id: MatchId,
        player: &str,
        raw_action: &str,
    ) -> Result<ActionOutcome, EngineError> {
        let action = parse_action(raw_action)?;
        self.submit(id, player, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MatchHandle;
    use tetromatch_core::types::MatchMode;
    use tokio::sync::mpsc;

    #[test]
    fn parse_action_accepts_ids_and_aliases() {
        assert_eq!(parse_action("move-left"), Ok(MatchAction::MoveLeft));
        assert_eq!(parse_action("drop"), Ok(MatchAction::SoftDrop));
        assert_eq!(parse_action("Hold"), Ok(MatchAction::Hold));
        assert_eq!(
            parse_action("teleport"),
            Err(EngineError::InvalidAction("teleport".to_string()))
        );
    }

    #[test]
    fn outcome_wire_names() {
        assert_eq!(ActionOutcome::Applied.as_str(), "applied");
        assert_eq!(
            ActionOutcome::Ignored(IgnoreReason::NotPermitted).as_str(),
            "not-permitted"
        );
    }

    #[tokio::test]
    async fn submit_to_unknown_match_fails() {
        let registry = Arc::new(Registry::new());
        let dispatcher = Dispatcher::new(registry.clone());
        let id = registry.allocate();

        let result = dispatcher.submit(id, "alice", MatchAction::Rotate).await;
        assert_eq!(result, Err(EngineError::UnknownMatch(id)));
    }

    #[tokio::test]
    async fn submit_to_stopped_task_fails() {
        let registry = Arc::new(Registry::new());
        let dispatcher = Dispatcher::new(registry.clone());
        let id = registry.allocate();
        let (tx, rx) = mpsc::unbounded_channel();
        registry
            .insert(MatchHandle {
                id,
                player: "alice".to_string(),
                mode: MatchMode::Solo,
                tx,
            })
            .await;
        drop(rx);

        let result = dispatcher.submit_raw(id, "alice", "rotate").await;
        assert_eq!(result, Err(EngineError::UnknownMatch(id)));
    }

    #[tokio::test]
    async fn submit_waits_for_the_task_reply() {
        let registry = Arc::new(Registry::new());
        let dispatcher = Dispatcher::new(registry.clone());
        let id = registry.allocate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .insert(MatchHandle {
                id,
                player: "alice".to_string(),
                mode: MatchMode::Solo,
                tx,
            })
            .await;

        tokio::spawn(async move {
            if let Some(Command::Action { reply, action, .. }) = rx.recv().await {
                assert_eq!(action, MatchAction::Hold);
                let _ = reply.send(ActionOutcome::Unchanged);
            }
        });

        let outcome = dispatcher.submit(id, "alice", MatchAction::Hold).await;
        assert_eq!(outcome, Ok(ActionOutcome::Unchanged));
    }
}
