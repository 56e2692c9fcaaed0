//! Match runtime - one tokio task per match
//!
//! The task owns its [`Match`], its inbound queue and its gravity timer. Gravity ticks,
//! player actions, garbage and opponent signals all arrive through one `select!` loop,
//! so a match never sees two inputs at once. Leaving the loop drops the timer; no tick can
//! reach an ended match.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use tetromatch_core::types::{MatchAction, MatchStatus, TerminationReason};

use crate::dispatch::ActionOutcome;
use crate::event::{EventSink, MatchEvent};
use crate::link::{PairingLink, Side};
use crate::session::{Effects, Match};

/// Inbound message for a match task
#[derive(Debug)]
pub enum Command {
    Action {
        player: String,
        action: MatchAction,
        reply: oneshot::Sender<ActionOutcome>,
    },
    /// Garbage rows cleared by the paired opponent
    Garbage(u32),
    /// The paired opponent finished first
    OpponentFinished,
}

pub struct MatchTask {
    session: Match,
    commands: UnboundedReceiver<Command>,
    link: Option<(Arc<PairingLink>, Side)>,
    sink: Arc<dyn EventSink>,
    start_delay: Duration,
}

impl MatchTask {
    pub fn new(
        session: Match,
        commands: UnboundedReceiver<Command>,
        link: Option<(Arc<PairingLink>, Side)>,
        sink: Arc<dyn EventSink>,
        start_delay: Duration,
    ) -> Self {
        Self {
            session,
            commands,
            link,
            sink,
            start_delay,
        }
    }

    /// Drive the match to completion
    ///
    /// Waits for `start` (sent once the match is registered), then the start delay, then
    /// plays until the match ends. `done` fires after the terminal event was published.
    pub async fn run(mut self, start: oneshot::Receiver<()>, done: oneshot::Sender<()>) {
        let id = self.session.id();
        if start.await.is_err() {
            log::warn!("[match {}] never registered, dropping", id);
            return;
        }

        log::debug!("[match {}] pending start for {:?}", id, self.start_delay);
        if self.wait_for_start().await {
            self.begin();
            self.play().await;
        }

        log::debug!("[match {}] task finished", id);
        let _ = done.send(());
    }

    /// Returns false if the match ended (or was abandoned) before it could start
    async fn wait_for_start(&mut self) -> bool {
        let delay = time::sleep(self.start_delay);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut delay => return true,
                command = self.commands.recv() => match command {
                    Some(command) => {
                        self.handle(command);
                        if self.session.status() == MatchStatus::Ended {
                            return false;
                        }
                    }
                    None => return false,
                },
            }
        }
    }

    fn begin(&mut self) {
        let effects = self.session.start();
        log::info!(
            "[match {}] started for {}",
            self.session.id(),
            self.session.config().player
        );
        self.sink.publish(MatchEvent::Started {
            id: self.session.id(),
            player: self.session.config().player.clone(),
        });
        self.settle(effects);
    }

    async fn play(&mut self) {
        let mut period = self.session.gravity_interval();
        let mut gravity = gravity_timer(period);

        while self.session.status() == MatchStatus::Active {
            tokio::select! {
                _ = gravity.tick() => {
                    let effects = self.session.tick();
                    self.settle(effects);
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        log::debug!("[match {}] abandoned", self.session.id());
                        let effects = self.session.terminate(TerminationReason::Forfeit);
                        self.settle(effects);
                    }
                },
            }

            let next = self.session.gravity_interval();
            if next != period {
                log::debug!("[match {}] gravity now {:?}", self.session.id(), next);
                period = next;
                gravity = gravity_timer(period);
            }
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Action {
                player,
                action,
                reply,
            } => {
                let (outcome, effects) = self.session.apply(&player, action);
                log::debug!(
                    "[match {}] {} {} -> {}",
                    self.session.id(),
                    player,
                    action.as_str(),
                    outcome.as_str()
                );
                self.settle(effects);
                // Events go out before the caller hears back.
                let _ = reply.send(outcome);
            }
            Command::Garbage(rows) => {
                let effects = self.session.receive_garbage(rows);
                self.settle(effects);
            }
            Command::OpponentFinished => {
                let effects = self.session.opponent_finished();
                self.settle(effects);
            }
        }
    }

    fn settle(&mut self, effects: Effects) {
        let id = self.session.id();

        if effects.board_changed {
            self.sink.publish(MatchEvent::BoardChanged {
                id,
                snapshot: Box::new(self.session.snapshot()),
                score: self.session.score(),
            });
        }

        if effects.lines_cleared > 0 {
            if let Some((link, side)) = &self.link {
                link.forward_garbage(*side, effects.lines_cleared);
            }
        }

        if let Some(reason) = effects.ended {
            self.finish(reason);
        }
    }

    fn finish(&mut self, reason: TerminationReason) {
        let id = self.session.id();
        let final_score = self.session.score();
        log::info!(
            "[match {}] ended ({}) with {} points",
            id,
            reason.as_str(),
            final_score
        );

        if let Some((link, side)) = &self.link {
            link.report_finished(*side);
        }
        self.sink.publish(MatchEvent::Terminated {
            id,
            final_score,
            reason,
        });
    }
}

fn gravity_timer(period: Duration) -> Interval {
    let mut timer = time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
