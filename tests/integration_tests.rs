//! Integration tests for match lifecycles through the public engine API

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time;

use tetromatch::engine::{
    ActionOutcome, Engine, EngineConfig, EngineError, GravityPolicy, IgnoreReason, MatchConfig,
    MatchEvent, MatchId,
};
use tetromatch::types::{MatchAction, TerminationReason};

fn engine_with(gravity_ms: u64) -> (Engine, UnboundedReceiver<MatchEvent>) {
    let config = EngineConfig {
        gravity: GravityPolicy::Constant(Duration::from_millis(gravity_ms)),
        seed: Some(2024),
        ..EngineConfig::default()
    };
    let (tx, rx) = mpsc::unbounded_channel::<MatchEvent>();
    (Engine::new(config, tx), rx)
}

fn drain(events: &mut UnboundedReceiver<MatchEvent>) -> Vec<MatchEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn terminations(events: &[MatchEvent], id: MatchId) -> Vec<TerminationReason> {
    events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::Terminated { id: tid, reason, .. } if *tid == id => Some(*reason),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_solo_match_ignores_other_players() {
    let (engine, mut events) = engine_with(1000);
    let id = engine
        .create_match(MatchConfig::solo("lobby", "alice"))
        .await
        .unwrap();
    assert!(matches!(events.recv().await, Some(MatchEvent::Started { .. })));

    let outcome = engine.submit(id, "mallory", MatchAction::Forfeit).await;
    assert_eq!(outcome, Ok(ActionOutcome::Ignored(IgnoreReason::NotPermitted)));

    let outcome = engine.submit(id, "alice", MatchAction::MoveLeft).await;
    assert_eq!(outcome, Ok(ActionOutcome::Applied));
    assert!(engine.contains(id).await);
}

#[tokio::test(start_paused = true)]
async fn test_open_match_accepts_anyone() {
    let (engine, mut events) = engine_with(1000);
    let id = engine
        .create_match(MatchConfig::open("arcade", "host"))
        .await
        .unwrap();
    assert!(matches!(events.recv().await, Some(MatchEvent::Started { .. })));

    assert_eq!(
        engine.submit(id, "visitor", MatchAction::MoveRight).await,
        Ok(ActionOutcome::Applied)
    );
    assert_eq!(
        engine.submit(id, "visitor", MatchAction::Forfeit).await,
        Ok(ActionOutcome::Applied)
    );

    time::sleep(Duration::from_millis(1)).await;
    assert_eq!(
        terminations(&drain(&mut events), id),
        vec![TerminationReason::Forfeit]
    );
}

#[tokio::test(start_paused = true)]
async fn test_forfeit_before_paired_start_is_ignored() {
    let (engine, mut events) = engine_with(1000);
    let (a, b) = engine
        .create_paired_matches(
            MatchConfig::paired("duel", "alice", "p1"),
            MatchConfig::paired("duel", "bob", "p1"),
        )
        .await
        .unwrap();

    assert_eq!(
        engine.submit(a, "alice", MatchAction::Forfeit).await,
        Ok(ActionOutcome::Ignored(IgnoreReason::IllegalTransition))
    );
    assert!(drain(&mut events).is_empty());

    // Default paired delay is five seconds
    time::sleep(Duration::from_millis(5001)).await;
    let started: Vec<MatchId> = drain(&mut events)
        .iter()
        .filter_map(|e| match e {
            MatchEvent::Started { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(started.len(), 2);
    assert!(started.contains(&a) && started.contains(&b));
}

#[tokio::test(start_paused = true)]
async fn test_paired_forfeit_decides_winner() {
    let (engine, mut events) = engine_with(1000);
    let (a, b) = engine
        .create_paired_matches(
            MatchConfig::paired("duel", "alice", "p2").with_start_delay(Duration::ZERO),
            MatchConfig::paired("duel", "bob", "p2").with_start_delay(Duration::ZERO),
        )
        .await
        .unwrap();
    time::sleep(Duration::from_millis(1)).await;

    assert_eq!(
        engine.submit(b, "bob", MatchAction::Forfeit).await,
        Ok(ActionOutcome::Applied)
    );
    time::sleep(Duration::from_millis(10)).await;

    let seen = drain(&mut events);
    assert_eq!(terminations(&seen, b), vec![TerminationReason::Forfeit]);
    assert_eq!(
        terminations(&seen, a),
        vec![TerminationReason::OpponentFinished]
    );
    let completed: Vec<_> = seen
        .iter()
        .filter_map(|e| match e {
            MatchEvent::PairCompleted {
                pair_id,
                winner,
                loser,
            } => Some((pair_id.as_str(), winner.as_str(), loser.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![("p2", "alice", "bob")]);

    assert_eq!(engine.match_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_ended_match_becomes_unknown() {
    let (engine, mut events) = engine_with(1000);
    let id = engine
        .create_match(MatchConfig::solo("lobby", "alice"))
        .await
        .unwrap();
    assert!(matches!(events.recv().await, Some(MatchEvent::Started { .. })));

    tokio_test::assert_ok!(engine.submit(id, "alice", MatchAction::Forfeit).await);
    time::sleep(Duration::from_millis(1)).await;

    assert!(!engine.contains(id).await);
    assert_eq!(
        engine.submit(id, "alice", MatchAction::MoveLeft).await,
        Err(EngineError::UnknownMatch(id))
    );
    assert_eq!(
        engine.submit(MatchId::new(999), "alice", MatchAction::MoveLeft).await,
        Err(EngineError::UnknownMatch(MatchId::new(999)))
    );
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_action_is_rejected() {
    let (engine, mut events) = engine_with(1000);
    let id = engine
        .create_match(MatchConfig::solo("lobby", "alice"))
        .await
        .unwrap();
    assert!(matches!(events.recv().await, Some(MatchEvent::Started { .. })));

    assert_eq!(
        engine.submit_raw(id, "alice", "moonwalk").await,
        Err(EngineError::InvalidAction("moonwalk".to_string()))
    );
    let outcome = tokio_test::assert_ok!(engine.submit_raw(id, "alice", "hard-drop").await);
    assert_eq!(outcome, ActionOutcome::Applied);
}

#[tokio::test(start_paused = true)]
async fn test_gravity_alone_tops_out_and_scores_nothing() {
    let (engine, mut events) = engine_with(10);
    let id = engine
        .create_match(MatchConfig::solo("lobby", "idle"))
        .await
        .unwrap();

    time::sleep(Duration::from_secs(120)).await;

    let seen = drain(&mut events);
    assert_eq!(terminations(&seen, id), vec![TerminationReason::TopOut]);
    assert!(seen.iter().all(|e| match e {
        MatchEvent::BoardChanged { score, .. } => *score == 0,
        MatchEvent::Terminated { final_score, .. } => *final_score == 0,
        _ => true,
    }));
    // Nothing follows the terminal event
    assert!(matches!(seen.last(), Some(MatchEvent::Terminated { .. })));
    assert!(!engine.contains(id).await);
}
