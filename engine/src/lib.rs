//! Async driver for Beacon.
//!
//! The session controller from `beacon-core` is deterministic and knows nothing
//! about wall-clock time. This crate runs it on a tokio task: commands arrive on
//! a channel, a fixed-period interval advances the controller's clock, feedback
//! leaves on an unbounded channel, and a `watch` channel publishes the latest
//! guidance snapshot to any number of readers.

use std::time::Duration;

use thiserror::Error;

pub use beacon_core::{AgentPose, FeedbackEvent, Resolution, SessionController, Stage};
pub use beacon_types::{ObjectiveId, SessionState, TierName, Vec3};

mod runtime;
pub use runtime::{ChannelFeedback, Engine, EngineHandle};

/// Input to the running engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    StartGame,
    CancelGame,
    /// The agent moved; subsequent polls and direction requests use this pose.
    AgentMoved(AgentPose),
    /// The agent reached an objective.
    Resolve(ObjectiveId),
    RequestDirection,
    /// End the game early (e.g. the agent ran out of energy).
    EndGame,
    Shutdown,
}

/// Read-only view of the session, published after every engine tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuidanceSnapshot {
    pub session: SessionState,
    pub cursor_visible: bool,
    /// `None` before the first poll of a session, and outside `Game`/`End`.
    pub tier: Option<TierName>,
    pub nearest_point: Option<Vec3>,
    pub suppress_direction: bool,
    /// Unresolved objectives, terminal included. Zero outside a session.
    pub remaining: usize,
    pub terminal_revealed: bool,
    /// Time on the controller's virtual clock.
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine has shut down")]
    Closed,
    #[error("engine task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
