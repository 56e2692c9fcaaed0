//! Match state machine
//!
//! A `Match` owns one playfield and walks PendingStart -> Active -> Ended, never backwards.
//! It is synchronous: the runtime feeds it gravity ticks, player actions and garbage, and
//! turns the returned [`Effects`] into events and link messages.

use std::time::Duration;

use tetromatch_core::types::{
    Direction, MatchAction, MatchMode, MatchStatus, TerminationReason,
};
use tetromatch_core::{BoardSnapshot, DropSource, HoldOutcome, LockSummary, Playfield};

use crate::config::{GravityPolicy, MatchConfig};
use crate::dispatch::{ActionOutcome, IgnoreReason};
use crate::error::EngineError;
use crate::registry::MatchId;

/// What one step did to the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effects {
    pub board_changed: bool,
    pub locked: bool,
    pub lines_cleared: u32,
    /// Set only on the step that ended the match
    pub ended: Option<TerminationReason>,
}

impl Effects {
    fn changed(changed: bool) -> Self {
        Self {
            board_changed: changed,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct Match {
    id: MatchId,
    config: MatchConfig,
    gravity: GravityPolicy,
    playfield: Playfield,
    status: MatchStatus,
    reason: Option<TerminationReason>,
}

impl Match {
    pub fn new(
        id: MatchId,
        config: MatchConfig,
        gravity: GravityPolicy,
        seed: u32,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        Ok(Self {
            id,
            config,
            gravity,
            playfield: Playfield::new(seed),
            status: MatchStatus::PendingStart,
            reason: None,
        })
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.reason
    }

    pub fn score(&self) -> u32 {
        self.playfield.score()
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn playfield_mut(&mut self) -> &mut Playfield {
        &mut self.playfield
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.playfield.snapshot()
    }

    /// Current gravity step, re-read after every lock
    pub fn gravity_interval(&self) -> Duration {
        self.gravity.interval(self.playfield.level())
    }

    /// Open matches take input from anyone, the others only from their owner
    pub fn permits(&self, player: &str) -> bool {
        match self.config.mode {
            MatchMode::Open => true,
            MatchMode::Solo | MatchMode::Paired => self.config.player == player,
        }
    }

    /// Leave PendingStart and spawn the first piece
    pub fn start(&mut self) -> Effects {
        if self.status != MatchStatus::PendingStart {
            return Effects::default();
        }

        self.status = MatchStatus::Active;
        match self.playfield.spawn_next() {
            Ok(()) => Effects::changed(true),
            Err(_) => self.end(TerminationReason::TopOut),
        }
    }

    /// One gravity step: fall a row, or lock if the piece is resting
    pub fn tick(&mut self) -> Effects {
        if self.status != MatchStatus::Active {
            return Effects::default();
        }

        self.drop_or_lock(DropSource::Gravity)
    }

    pub fn apply(&mut self, player: &str, action: MatchAction) -> (ActionOutcome, Effects) {
        if !self.permits(player) {
            return (
                ActionOutcome::Ignored(IgnoreReason::NotPermitted),
                Effects::default(),
            );
        }
        if self.status != MatchStatus::Active {
            return (
                ActionOutcome::Ignored(IgnoreReason::IllegalTransition),
                Effects::default(),
            );
        }

        let effects = match action {
            MatchAction::MoveLeft => Effects::changed(self.playfield.try_move(Direction::Left)),
            MatchAction::MoveRight => Effects::changed(self.playfield.try_move(Direction::Right)),
            MatchAction::Rotate => Effects::changed(self.playfield.try_rotate()),
            MatchAction::SoftDrop => self.drop_or_lock(DropSource::Player),
            MatchAction::HardDrop => {
                let summary = self.playfield.hard_drop();
                self.after_lock(summary)
            }
            MatchAction::Hold => match self.playfield.hold() {
                HoldOutcome::Swapped => Effects::changed(true),
                HoldOutcome::Unavailable => Effects::default(),
                HoldOutcome::ToppedOut => Effects {
                    board_changed: true,
                    ..self.end(TerminationReason::TopOut)
                },
            },
            MatchAction::Forfeit => self.end(TerminationReason::Forfeit),
        };

        let outcome = if effects.is_empty() {
            ActionOutcome::Unchanged
        } else {
            ActionOutcome::Applied
        };
        (outcome, effects)
    }

    /// Push garbage rows from the opponent; only an active match takes them
    pub fn receive_garbage(&mut self, rows: u32) -> Effects {
        if self.status != MatchStatus::Active || rows == 0 {
            return Effects::default();
        }

        let report = self.playfield.inject_garbage(rows);
        if report.lifted > 0 {
            log::debug!("[match {}] garbage lifted piece by {}", self.id, report.lifted);
        }
        if report.overflowed {
            log::debug!("[match {}] garbage pushed blocks off the top", self.id);
        }
        Effects::changed(true)
    }

    pub fn opponent_finished(&mut self) -> Effects {
        self.terminate(TerminationReason::OpponentFinished)
    }

    /// End the match unless it already ended
    pub fn terminate(&mut self, reason: TerminationReason) -> Effects {
        if self.status == MatchStatus::Ended {
            return Effects::default();
        }
        self.end(reason)
    }

    fn end(&mut self, reason: TerminationReason) -> Effects {
        self.status = MatchStatus::Ended;
        self.reason = Some(reason);
        Effects {
            ended: Some(reason),
            ..Effects::default()
        }
    }

    /// Fall one row, or lock in place when the piece is resting
    fn drop_or_lock(&mut self, source: DropSource) -> Effects {
        if self.playfield.soft_drop(source) {
            return Effects::changed(true);
        }
        let summary = self.playfield.lock();
        self.after_lock(summary)
    }

    fn after_lock(&mut self, summary: LockSummary) -> Effects {
        let ended = if summary.topped_out {
            self.end(TerminationReason::TopOut).ended
        } else {
            None
        };

        Effects {
            board_changed: true,
            locked: true,
            lines_cleared: summary.lines_cleared,
            ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetromatch_core::types::{Cell, PieceKind, Rotation, BOARD_WIDTH};
    use tetromatch_core::Tetromino;

    fn solo() -> Match {
        Match::new(
            MatchId::new(1),
            MatchConfig::solo("chan", "alice"),
            GravityPolicy::default(),
            42,
        )
        .unwrap()
    }

    fn active() -> Match {
        let mut m = solo();
        m.start();
        m
    }

    /// Rows 20 and 21 full except column 0, with a vertical I ready to fill the gap
    fn two_line_setup(m: &mut Match) {
        let field = m.playfield_mut();
        for y in [20, 21] {
            for x in 1..BOARD_WIDTH as i8 {
                field.board_mut().set(x, y, Cell::Garbage);
            }
        }
        let bar = Tetromino {
            kind: PieceKind::I,
            rotation: Rotation::East,
            x: -2,
            y: 18,
        };
        assert!(field.place_active(bar));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = Match::new(
            MatchId::new(1),
            MatchConfig::solo("chan", ""),
            GravityPolicy::default(),
            1,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn pending_match_ignores_actions_and_ticks() {
        let mut m = solo();

        let (outcome, effects) = m.apply("alice", MatchAction::Forfeit);

        assert_eq!(outcome, ActionOutcome::Ignored(IgnoreReason::IllegalTransition));
        assert!(effects.is_empty());
        assert_eq!(m.status(), MatchStatus::PendingStart);
        assert!(m.tick().is_empty());
        assert!(m.receive_garbage(3).is_empty());
    }

    #[test]
    fn start_spawns_first_piece_once() {
        let mut m = solo();
        assert!(m.start().board_changed);
        assert_eq!(m.status(), MatchStatus::Active);
        assert!(m.playfield().active().is_some());
        assert!(m.start().is_empty());
    }

    #[test]
    fn only_owner_drives_solo_match() {
        let mut m = active();
        let before = m.snapshot();

        let (outcome, _) = m.apply("mallory", MatchAction::HardDrop);

        assert_eq!(outcome, ActionOutcome::Ignored(IgnoreReason::NotPermitted));
        assert_eq!(m.snapshot(), before);
    }

    #[test]
    fn open_match_accepts_anyone() {
        let mut m = Match::new(
            MatchId::new(1),
            MatchConfig::open("chan", "alice"),
            GravityPolicy::default(),
            42,
        )
        .unwrap();
        m.start();

        let (outcome, _) = m.apply("bob", MatchAction::MoveLeft);
        assert_eq!(outcome, ActionOutcome::Applied);
    }

    #[test]
    fn blocked_move_is_unchanged() {
        let mut m = active();
        while m.apply("alice", MatchAction::MoveLeft).0 == ActionOutcome::Applied {}

        let (outcome, effects) = m.apply("alice", MatchAction::MoveLeft);
        assert_eq!(outcome, ActionOutcome::Unchanged);
        assert!(!effects.board_changed);
    }

    #[test]
    fn second_hold_is_unchanged() {
        let mut m = active();
        assert_eq!(m.apply("alice", MatchAction::Hold).0, ActionOutcome::Applied);
        let snapshot = m.snapshot();

        assert_eq!(m.apply("alice", MatchAction::Hold).0, ActionOutcome::Unchanged);
        assert_eq!(m.snapshot(), snapshot);
    }

    #[test]
    fn gravity_falls_then_locks() {
        let mut m = active();
        let distance = m.playfield().drop_distance();
        for _ in 0..distance {
            let effects = m.tick();
            assert!(effects.board_changed && !effects.locked);
        }

        let effects = m.tick();
        assert!(effects.locked);
        assert_eq!(m.score(), 0);
        assert_eq!(m.playfield().piece_id(), 2);
    }

    #[test]
    fn blocked_soft_drop_locks() {
        let mut m = active();
        let distance = m.playfield().drop_distance();
        for _ in 0..distance {
            let (outcome, effects) = m.apply("alice", MatchAction::SoftDrop);
            assert_eq!(outcome, ActionOutcome::Applied);
            assert!(!effects.locked);
        }
        assert_eq!(m.playfield().piece_id(), 1);

        let (outcome, effects) = m.apply("alice", MatchAction::SoftDrop);

        assert_eq!(outcome, ActionOutcome::Applied);
        assert!(effects.locked && effects.board_changed);
        assert_eq!(m.playfield().piece_id(), 2);
        assert_eq!(m.score(), distance);
        assert_eq!(m.status(), MatchStatus::Active);
    }

    #[test]
    fn garbage_under_resting_piece_keeps_match_alive() {
        let mut m = active();
        let o = Tetromino {
            kind: PieceKind::O,
            rotation: Rotation::North,
            x: 4,
            y: 20,
        };
        assert!(m.playfield_mut().place_active(o));

        assert!(m.receive_garbage(1).board_changed);
        assert_eq!(m.playfield().active().map(|p| p.y), Some(19));

        let effects = m.tick();

        assert!(effects.locked);
        assert_eq!(effects.ended, None);
        assert_eq!(m.status(), MatchStatus::Active);
        assert_eq!(m.playfield().board().occupied_rows(), 3);
    }

    #[test]
    fn hard_drop_reports_cleared_lines() {
        let mut m = active();
        two_line_setup(&mut m);

        let (outcome, effects) = m.apply("alice", MatchAction::HardDrop);

        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(effects.lines_cleared, 2);
        assert_eq!(m.playfield().lines(), 2);
        assert_eq!(m.score(), 100);
    }

    #[test]
    fn forfeit_ends_once() {
        let mut m = active();

        let (_, effects) = m.apply("alice", MatchAction::Forfeit);
        assert_eq!(effects.ended, Some(TerminationReason::Forfeit));
        assert_eq!(m.status(), MatchStatus::Ended);

        assert!(m.terminate(TerminationReason::TopOut).is_empty());
        assert!(m.opponent_finished().is_empty());
        assert_eq!(m.termination_reason(), Some(TerminationReason::Forfeit));

        let (outcome, _) = m.apply("alice", MatchAction::Rotate);
        assert_eq!(outcome, ActionOutcome::Ignored(IgnoreReason::IllegalTransition));
    }

    #[test]
    fn garbage_lifts_the_stack() {
        let mut m = active();
        let effects = m.receive_garbage(2);

        assert!(effects.board_changed);
        assert_eq!(m.playfield().board().occupied_rows(), 2);
    }

    #[test]
    fn stack_reaching_spawn_tops_out() {
        let mut m = active();
        let mut ended = None;
        for _ in 0..200 {
            let (_, effects) = m.apply("alice", MatchAction::HardDrop);
            if effects.ended.is_some() {
                ended = effects.ended;
                break;
            }
        }

        assert_eq!(ended, Some(TerminationReason::TopOut));
        assert_eq!(m.status(), MatchStatus::Ended);
    }
}
