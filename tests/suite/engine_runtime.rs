//! The async engine driven the way the binary drives it.

use std::time::Duration;

use beacon_config::BeaconConfig;
use beacon_core::{FeedbackEvent, SequenceJitter, SessionController};
use beacon_engine::{ChannelFeedback, Engine, EngineCommand, EngineHandle, GuidanceSnapshot};
use beacon_types::{Cue, SessionState, TierName};

use crate::common::{FAST_CONFIG, ScriptedStage, id, pose, two_objectives};

const TICK: Duration = Duration::from_millis(10);

fn spawn_fast(feedback: ChannelFeedback) -> EngineHandle {
    let settings = BeaconConfig::parse(FAST_CONFIG)
        .unwrap()
        .resolve()
        .unwrap();
    let controller = SessionController::new(
        settings.guidance,
        settings.session,
        ScriptedStage::new(two_objectives()),
    )
    .with_jitter_source(SequenceJitter::new(vec![0.5]));
    Engine::spawn(controller, pose(0.0, 0.0), feedback, TICK)
}

#[tokio::test(start_paused = true)]
async fn full_game_through_the_engine() {
    let (sink, mut feedback) = ChannelFeedback::channel();
    let handle = spawn_fast(sink);
    let mut snapshots = handle.snapshots();

    handle.send(EngineCommand::StartGame).await.unwrap();
    snapshots
        .wait_for(|s| s.tier == Some(TierName::Medium))
        .await
        .unwrap();

    // Walk onto the first objective; the collision layer reports it.
    handle
        .send(EngineCommand::AgentMoved(pose(0.0, 19.0)))
        .await
        .unwrap();
    snapshots
        .wait_for(|s| s.tier == Some(TierName::High))
        .await
        .unwrap();
    handle.send(EngineCommand::Resolve(id(1))).await.unwrap();

    let revealed = snapshots
        .wait_for(|s| s.terminal_revealed)
        .await
        .unwrap()
        .clone();
    assert_eq!(revealed.remaining, 1);

    handle.send(EngineCommand::Resolve(id(9))).await.unwrap();
    let ended = snapshots
        .wait_for(|s| s.session == SessionState::End)
        .await
        .unwrap()
        .elapsed;
    let back = snapshots
        .wait_for(|s| s.session == SessionState::Menu)
        .await
        .unwrap()
        .elapsed;
    assert!(back - ended >= Duration::from_secs(2) - TICK);

    let mut cues = Vec::new();
    while let Ok(event) = feedback.try_recv() {
        if let FeedbackEvent::Cue(cue) = event {
            cues.push(cue);
        }
    }
    assert_eq!(cues, vec![Cue::ObjectiveReached, Cue::Transmission]);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn readers_share_one_view() {
    let handle = spawn_fast(ChannelFeedback::channel().0);
    let first = handle.snapshots();
    let mut second = handle.snapshots();

    handle.send(EngineCommand::StartGame).await.unwrap();
    second
        .wait_for(|s| s.session == SessionState::Game)
        .await
        .unwrap();
    let a: GuidanceSnapshot = first.borrow().clone();
    let b: GuidanceSnapshot = second.borrow().clone();
    assert_eq!(a, b);
    assert!(!a.cursor_visible);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancel_returns_to_menu_immediately() {
    let handle = spawn_fast(ChannelFeedback::channel().0);
    let mut snapshots = handle.snapshots();

    handle.send(EngineCommand::StartGame).await.unwrap();
    snapshots
        .wait_for(|s| s.tier.is_some())
        .await
        .unwrap();
    handle.send(EngineCommand::CancelGame).await.unwrap();
    let snapshot = snapshots
        .wait_for(|s| s.session == SessionState::Menu)
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.tier, None);
    assert_eq!(snapshot.remaining, 0);

    handle.shutdown().await.unwrap();
}
