//! Boundary runtime: the tokio task, its channels, and the frame timer.
//!
//! Everything async lives here. The controller itself is only ever touched from
//! the engine task, so guidance state keeps a single writer; other tasks read
//! it through [`GuidanceSnapshot`]s on the `watch` channel.

mod feedback;

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};

use beacon_core::{AgentPose, GuidanceState, ObjectiveRegistry, SessionController, Stage};
use beacon_types::SessionState;

use crate::{EngineCommand, EngineError, GuidanceSnapshot};

pub use feedback::ChannelFeedback;

/// Channel capacity for commands sent to the engine task.
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Maximum commands handled per tick.
const COMMAND_BUDGET: usize = 64;

pub struct Engine<S> {
    controller: SessionController<S>,
    agent: AgentPose,
    commands: mpsc::Receiver<EngineCommand>,
    feedback: ChannelFeedback,
    snapshots: watch::Sender<GuidanceSnapshot>,
    tick: Duration,
}

enum Flow {
    Continue,
    Stop,
}

impl<S> Engine<S>
where
    S: Stage + Send + 'static,
{
    /// Spawn the engine on the current tokio runtime.
    ///
    /// `tick` is the frame period; the controller's clock advances by the real
    /// elapsed time between frames. Feedback goes to `feedback`; dropping its
    /// receiver discards further events instead of queueing them.
    pub fn spawn(
        controller: SessionController<S>,
        agent: AgentPose,
        feedback: ChannelFeedback,
        tick: Duration,
    ) -> EngineHandle {
        let (command_tx, commands) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (snapshots, snapshot_rx) = watch::channel(GuidanceSnapshot::default());

        let engine = Self {
            controller,
            agent,
            commands,
            feedback,
            snapshots,
            tick,
        };
        engine.publish();
        let join = tokio::spawn(engine.run());

        EngineHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            join,
        }
    }

    async fn run(mut self) {
        tracing::info!(tick_ms = self.tick.as_millis(), "Engine started");
        let mut frames = interval(self.tick);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();

        loop {
            frames.tick().await;
            let now = Instant::now();
            let delta = now.duration_since(last);
            last = now;

            if let Flow::Stop = self.drain_commands(COMMAND_BUDGET) {
                break;
            }
            self.controller
                .tick(delta, &self.agent, &mut self.feedback);
            self.publish();
        }

        self.publish();
        tracing::info!(state = %self.controller.state(), "Engine stopped");
    }

    /// Handle pending commands, up to `budget`. Non-blocking.
    fn drain_commands(&mut self, budget: usize) -> Flow {
        for _ in 0..budget {
            match self.commands.try_recv() {
                Ok(command) => {
                    if let Flow::Stop = self.handle(command) {
                        return Flow::Stop;
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::debug!("All engine handles dropped");
                    return Flow::Stop;
                }
            }
        }
        Flow::Continue
    }

    fn handle(&mut self, command: EngineCommand) -> Flow {
        match command {
            EngineCommand::StartGame => self.transition(SessionState::Game),
            EngineCommand::CancelGame => {
                if self.controller.state() == SessionState::Game {
                    self.transition(SessionState::Menu);
                } else {
                    tracing::warn!(state = %self.controller.state(), "Cancel outside a game ignored");
                }
            }
            EngineCommand::EndGame => self.transition(SessionState::End),
            EngineCommand::AgentMoved(pose) => self.agent = pose,
            EngineCommand::Resolve(id) => {
                if let Err(err) = self.controller.mark_resolved(id, &mut self.feedback) {
                    tracing::warn!(%id, "Resolution rejected: {err}");
                }
            }
            EngineCommand::RequestDirection => {
                self.controller
                    .request_direction(&self.agent, &mut self.feedback);
            }
            EngineCommand::Shutdown => return Flow::Stop,
        }
        Flow::Continue
    }

    fn transition(&mut self, to: SessionState) {
        if let Err(err) = self.controller.request_transition(to, &mut self.feedback) {
            tracing::debug!(%to, "Transition not applied: {err}");
        }
    }

    fn publish(&self) {
        let guidance = self.controller.guidance();
        let registry = self.controller.registry();
        let snapshot = GuidanceSnapshot {
            session: self.controller.state(),
            cursor_visible: self.controller.cursor_visible(),
            tier: guidance.and_then(GuidanceState::current_tier),
            nearest_point: guidance
                .filter(|g| g.current_tier().is_some())
                .map(GuidanceState::nearest_point),
            suppress_direction: guidance.is_some_and(GuidanceState::suppress_direction),
            remaining: registry.map_or(0, ObjectiveRegistry::remaining),
            terminal_revealed: registry
                .is_some_and(ObjectiveRegistry::is_terminal_revealed),
            elapsed: self.controller.now(),
        };
        self.snapshots.send_replace(snapshot);
    }
}

/// Owner side of a running engine.
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    snapshots: watch::Receiver<GuidanceSnapshot>,
    join: JoinHandle<()>,
}

impl EngineHandle {
    pub async fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| EngineError::Closed)
    }

    /// Additional command sender, e.g. for an input task.
    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<EngineCommand> {
        self.commands.clone()
    }

    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<GuidanceSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GuidanceSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop the engine and wait for its task to finish.
    pub async fn shutdown(self) -> Result<(), EngineError> {
        // Already stopped is fine; the join below reports real failures.
        let _ = self.commands.send(EngineCommand::Shutdown).await;
        self.join.await?;
        Ok(())
    }
}
