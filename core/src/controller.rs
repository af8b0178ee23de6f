//! Session controller.
//!
//! Owns the state machine, the guidance session (registry, poller, jitter) and
//! the scheduler that drives them. All mutation happens through
//! [`SessionController::tick`] and the request methods, one call at a time.

use std::time::Duration;

use thiserror::Error;

use beacon_types::{
    Cue, Direction, GuidanceSettings, ObjectiveId, SessionSettings, SessionState,
};

use crate::agent::Agent;
use crate::feedback::FeedbackSink;
use crate::guidance::{GuidanceState, PollOutcome, ProximityPoller};
use crate::interference::{InterferenceJitter, JitterSource, ThreadJitter};
use crate::machine::{SessionMachine, Transition, TransitionError};
use crate::registry::{ObjectiveRegistry, RegistryError, Resolution};
use crate::scheduler::{CancelToken, Due, Scheduler};

/// Scene loading collaborator.
pub trait Stage {
    /// Load the game scene and build the registry from its objectives.
    fn load_game(&mut self) -> Result<ObjectiveRegistry, RegistryError>;

    fn load_menu(&mut self);
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Poll,
    Interference,
    ReturnToMenu,
}

#[derive(Debug)]
struct GuidanceSession {
    registry: ObjectiveRegistry,
    poller: ProximityPoller,
    jitter: InterferenceJitter,
    poll_token: CancelToken,
    jitter_token: CancelToken,
}

impl GuidanceSession {
    fn cancel(&self) {
        self.poll_token.cancel();
        self.jitter_token.cancel();
    }
}

pub struct SessionController<S> {
    machine: SessionMachine,
    guidance: GuidanceSettings,
    session_settings: SessionSettings,
    stage: S,
    scheduler: Scheduler<Task>,
    session: Option<GuidanceSession>,
    jitter_source: Box<dyn JitterSource + Send>,
}

impl<S: Stage> SessionController<S> {
    #[must_use]
    pub fn new(guidance: GuidanceSettings, session_settings: SessionSettings, stage: S) -> Self {
        Self {
            machine: SessionMachine::new(&session_settings),
            guidance,
            session_settings,
            stage,
            scheduler: Scheduler::new(),
            session: None,
            jitter_source: Box::new(ThreadJitter),
        }
    }

    #[must_use]
    pub fn with_jitter_source(mut self, source: impl JitterSource + Send + 'static) -> Self {
        self.jitter_source = Box::new(source);
        self
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.machine.cursor_visible()
    }

    /// Guidance state of the running session, if any.
    #[must_use]
    pub fn guidance(&self) -> Option<&GuidanceState> {
        self.session.as_ref().map(|s| s.poller.state())
    }

    #[must_use]
    pub fn registry(&self) -> Option<&ObjectiveRegistry> {
        self.session.as_ref().map(|s| &s.registry)
    }

    /// Time on the controller's virtual clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    #[must_use]
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Request a session transition.
    ///
    /// Edges outside the session graph are rejected and leave the state
    /// unchanged. A game scene whose registry fails validation aborts
    /// `Menu -> Game`.
    pub fn request_transition(
        &mut self,
        to: SessionState,
        sink: &mut dyn FeedbackSink,
    ) -> Result<Transition, ControllerError> {
        let from = self.machine.state();
        let transition = self.machine.check(to).inspect_err(|err| {
            tracing::warn!(%from, %to, "Rejected session transition: {err}");
        })?;

        match transition {
            Transition::StartGame => {
                let registry = self.stage.load_game().inspect_err(|err| {
                    tracing::warn!("Game scene failed to load: {err}");
                })?;
                self.machine.request(to)?;
                self.start_session(registry, sink);
            }
            Transition::EndGame => {
                self.machine.request(to)?;
                self.enter_end(sink);
            }
            Transition::CancelGame | Transition::ReturnToMenu => {
                self.machine.request(to)?;
                self.teardown();
                self.stage.load_menu();
            }
        }

        tracing::info!(%from, %to, "Session transition");
        Ok(transition)
    }

    /// Resolve an objective. Ignored outside `Game`.
    pub fn mark_resolved(
        &mut self,
        id: ObjectiveId,
        sink: &mut dyn FeedbackSink,
    ) -> Result<Resolution, ControllerError> {
        if self.machine.state() != SessionState::Game {
            tracing::debug!(%id, state = %self.machine.state(), "Ignoring resolution");
            return Ok(Resolution::Ignored);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(Resolution::Ignored);
        };

        let resolution = session.registry.mark_resolved(id)?;
        if let Resolution::Resolved { terminal } = resolution {
            tracing::info!(%id, terminal, remaining = session.registry.remaining(), "Objective resolved");
            sink.play_cue(if terminal {
                Cue::Transmission
            } else {
                Cue::ObjectiveReached
            });
        }
        Ok(resolution)
    }

    /// On-demand direction hint. `None` outside `Game` or while suppressed.
    pub fn request_direction(
        &self,
        agent: &dyn Agent,
        sink: &mut dyn FeedbackSink,
    ) -> Option<Direction> {
        if self.machine.state() != SessionState::Game {
            return None;
        }
        self.session
            .as_ref()?
            .poller
            .report_direction(agent, sink)
    }

    /// Advance the virtual clock by `delta`, running every task that falls due.
    ///
    /// A repeating task runs at most once per call; periods it missed while
    /// the caller was stalled are skipped.
    pub fn tick(&mut self, delta: Duration, agent: &dyn Agent, sink: &mut dyn FeedbackSink) {
        let until = self.scheduler.now().saturating_add(delta);
        while let Some(due) = self.scheduler.pop_due(until) {
            self.run(due, agent, sink);
        }
        self.scheduler.set_now(until);
    }

    fn run(&mut self, due: Due<Task>, agent: &dyn Agent, sink: &mut dyn FeedbackSink) {
        let task = due.task;
        match task {
            Task::Poll => {
                if self.machine.state() != SessionState::Game {
                    return;
                }
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                match session.poller.poll(&mut session.registry, agent, sink) {
                    PollOutcome::Tracking { .. } => {
                        self.scheduler
                            .repeat(due, self.guidance.distance_check_wait_time());
                    }
                    PollOutcome::Exhausted => {
                        due.token.cancel();
                        if let Err(err) = self.request_transition(SessionState::End, sink) {
                            tracing::warn!("Could not end session: {err}");
                        }
                    }
                }
            }
            Task::Interference => {
                let Some(session) = self.session.as_ref() else {
                    return;
                };
                session.jitter.tick(
                    session.poller.state(),
                    session.poller.tiers(),
                    self.jitter_source.as_mut(),
                    sink,
                );
                self.scheduler
                    .repeat(due, self.guidance.interference_time());
            }
            Task::ReturnToMenu => {
                if self.machine.state() != SessionState::End {
                    return;
                }
                if let Err(err) = self.request_transition(SessionState::Menu, sink) {
                    tracing::warn!("Could not return to menu: {err}");
                }
            }
        }
    }

    fn start_session(&mut self, registry: ObjectiveRegistry, sink: &mut dyn FeedbackSink) {
        let tiers = self.guidance.tiers().clone();
        sink.set_grain_intensity(tiers.fallback().grain_intensity());

        let warmup = self.guidance.initial_distance_check_wait_time();
        let poll_token = self.scheduler.schedule(Task::Poll, warmup);
        let jitter_token = self.scheduler.schedule(Task::Interference, warmup);

        tracing::info!(
            objectives = registry.remaining(),
            warmup_ms = warmup.as_millis(),
            "Guidance session started"
        );
        self.session = Some(GuidanceSession {
            registry,
            poller: ProximityPoller::new(tiers),
            jitter: InterferenceJitter::new(self.guidance.interference_fill_variance()),
            poll_token,
            jitter_token,
        });
    }

    fn enter_end(&mut self, sink: &mut dyn FeedbackSink) {
        sink.report_direction(Direction::None);
        if let Some(session) = &self.session {
            session.poll_token.cancel();
        }
        self.scheduler
            .schedule(Task::ReturnToMenu, self.session_settings.end_game_delay);
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel();
            tracing::debug!("Guidance session torn down");
        }
        self.scheduler.clear();
    }
}
