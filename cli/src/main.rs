//! Beacon CLI - headless guidance simulation.
//!
//! # Architecture
//!
//! The binary wires [`beacon_config`] (settings), [`beacon_core`] (session
//! logic) and [`beacon_engine`] (async driver) to a generated scene and an
//! autopilot agent standing in for player input and collision.
//!
//! ```text
//! main() -> Settings::load() -> Layout::generate() -> Engine::spawn()
//!                                                         |
//!                                                         v
//!                    drive(): snapshot -> Autopilot::step -> AgentMoved/Resolve
//! ```
//!
//! # Event Loop
//!
//! The driver runs on a fixed 50ms cadence:
//!
//! 1. Wait for frame tick
//! 2. Read the latest guidance snapshot
//! 3. Report session and tier changes
//! 4. Step the autopilot and send its pose and any reached objectives
//! 5. Stop once the session is back in the menu

mod autopilot;
mod scene;

use anyhow::{Context, Result};
use std::{
    fs::{self, File, OpenOptions},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use beacon_config::{Settings, config_path};
use beacon_core::{FeedbackEvent, SessionController};
use beacon_engine::{ChannelFeedback, Engine, EngineCommand, EngineHandle, GuidanceSnapshot};
use beacon_types::{Cue, SessionState};

use crate::autopilot::Autopilot;
use crate::scene::{Layout, SimulatedStage};

const ENGINE_TICK: Duration = Duration::from_millis(10);
const FRAME_DURATION: Duration = Duration::from_millis(50);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_beacon_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: keep stdout for the simulation report.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_beacon_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in beacon_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn beacon_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.beacon/logs/beacon.log
    if let Some(config_path) = config_path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("beacon.log"));
    }

    // Fallback: ./.beacon/logs/beacon.log
    candidates.push(PathBuf::from(".beacon").join("logs").join("beacon.log"));

    candidates
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = Settings::load().context("failed to load configuration")?;
    let layout = Layout::generate(&settings.scene);
    tracing::info!(
        objectives = layout.objectives().len(),
        spread = settings.scene.spread(),
        "Scene generated"
    );

    let mut autopilot = Autopilot::new(layout.clone(), &settings.scene);
    let controller = SessionController::new(
        settings.guidance,
        settings.session,
        SimulatedStage::new(layout),
    );
    let (feedback, feedback_rx) = ChannelFeedback::channel();
    let handle = Engine::spawn(controller, autopilot.pose(), feedback, ENGINE_TICK);
    tokio::spawn(report_feedback(feedback_rx));

    let interrupted = tokio::select! {
        result = drive(&handle, &mut autopilot) => {
            result?;
            false
        }
        _ = signal::ctrl_c() => true,
    };

    if interrupted {
        println!("Interrupted, cancelling game");
        if handle.snapshot().session == SessionState::Game {
            handle.send(EngineCommand::CancelGame).await?;
        }
    }

    handle.shutdown().await?;
    Ok(())
}

/// Run one game from start until the session is back in the menu.
async fn drive(handle: &EngineHandle, autopilot: &mut Autopilot) -> Result<()> {
    let mut snapshots = handle.snapshots();
    handle.send(EngineCommand::StartGame).await?;
    snapshots
        .wait_for(|s| s.session == SessionState::Game)
        .await
        .context("engine stopped before the game started")?;
    println!("Game started");

    let mut frames = interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut previous = handle.snapshot();
    let mut last = Instant::now();

    loop {
        frames.tick().await;
        let now = Instant::now();
        let dt = now.duration_since(last);
        last = now;

        let snapshot = handle.snapshot();
        report_changes(&previous, &snapshot);
        if snapshot.session == SessionState::Menu {
            break;
        }
        if snapshot.tier != previous.tier && !snapshot.suppress_direction {
            handle.send(EngineCommand::RequestDirection).await?;
        }

        let step = autopilot.step(&snapshot, dt);
        handle.send(EngineCommand::AgentMoved(step.pose)).await?;
        for id in step.reached {
            handle.send(EngineCommand::Resolve(id)).await?;
        }
        previous = snapshot;
    }

    println!("Back in menu");
    Ok(())
}

fn report_changes(previous: &GuidanceSnapshot, current: &GuidanceSnapshot) {
    if current.session != previous.session {
        println!(
            "[{:>6.1}s] session {} -> {}",
            current.elapsed.as_secs_f32(),
            previous.session,
            current.session
        );
    }
    if current.tier != previous.tier
        && let Some(tier) = current.tier
    {
        println!(
            "[{:>6.1}s] signal {tier}, {} objective(s) left",
            current.elapsed.as_secs_f32(),
            current.remaining
        );
    }
}

async fn report_feedback(mut feedback: mpsc::UnboundedReceiver<FeedbackEvent>) {
    while let Some(event) = feedback.recv().await {
        match event {
            FeedbackEvent::Cue(Cue::ObjectiveReached) => println!("Objective reached"),
            FeedbackEvent::Cue(Cue::Transmission) => println!("Transmission received"),
            FeedbackEvent::Reveal(id) => println!("Final objective revealed ({id})"),
            FeedbackEvent::Direction(direction) => {
                tracing::debug!(%direction, "Direction signal");
            }
            other => tracing::trace!(?other, "Feedback"),
        }
    }
}
