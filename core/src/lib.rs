//! Core guidance logic for Beacon.
//!
//! Deterministic, single-threaded building blocks: the objective registry,
//! distance classification, the proximity poller and interference jitter
//! tasks, the direction reporter, and the session state machine. Time is a
//! virtual clock advanced by the caller, so everything here is testable
//! without a runtime.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod agent;
mod classifier;
mod controller;
mod direction;
mod feedback;
mod guidance;
mod interference;
mod machine;
mod registry;
pub mod scheduler;

pub use agent::{Agent, AgentPose};
pub use classifier::{classify, reports_direction};
pub use controller::{ControllerError, SessionController, Stage};
pub use direction::{Probe, ProbeError, ProbeSet, nearest_direction};
pub use feedback::{FeedbackEvent, FeedbackSink};
pub use guidance::{GuidanceState, PollOutcome, ProximityPoller};
pub use interference::{InterferenceJitter, JitterSource, SequenceJitter, ThreadJitter};
pub use machine::{SessionMachine, Transition, TransitionError};
pub use registry::{Nearest, ObjectiveRegistry, RegistryError, Resolution};
