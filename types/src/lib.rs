//! Core domain types for Beacon.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod settings;
mod tier;

pub use settings::{GuidanceSettings, SceneSettings, SessionSettings, SettingsError};
pub use tier::{IndicatorTier, TierError, TierName, TierTable};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

// ============================================================================
// Geometry
// ============================================================================

/// A point or offset in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Step from `self` toward `target` by at most `max_step`.
    #[must_use]
    pub fn move_towards(self, target: Self, max_step: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            return target;
        }
        self + delta * (max_step / dist)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ============================================================================
// Objectives
// ============================================================================

/// Stable identity of an objective within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectiveId(u32);

impl ObjectiveId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "objective#{}", self.0)
    }
}

/// A world-space target the agent must reach.
///
/// `resolved` only ever flips from false to true; there is no way back.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    id: ObjectiveId,
    position: Vec3,
    resolved: bool,
    terminal: bool,
}

impl Objective {
    #[must_use]
    pub fn new(id: ObjectiveId, position: Vec3) -> Self {
        Self {
            id,
            position,
            resolved: false,
            terminal: false,
        }
    }

    /// The final objective, revealed once every other objective is resolved.
    #[must_use]
    pub fn terminal(id: ObjectiveId, position: Vec3) -> Self {
        Self {
            terminal: true,
            ..Self::new(id, position)
        }
    }

    #[must_use]
    pub fn id(&self) -> ObjectiveId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Mark the objective resolved. Returns `true` only on the first call.
    pub fn resolve(&mut self) -> bool {
        let newly = !self.resolved;
        self.resolved = true;
        newly
    }
}

// ============================================================================
// Feedback signals
// ============================================================================

/// Coarse compass-like hint toward the tracked point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measuring points carried by the agent, in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    Front,
    Back,
    Left,
    Right,
}

impl ProbeKind {
    /// Enumeration order; earlier entries win distance ties.
    pub const ALL: [Self; 4] = [Self::Front, Self::Back, Self::Left, Self::Right];

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Front => Direction::Up,
            Self::Back => Direction::Down,
            Self::Left => Direction::Left,
            Self::Right => Direction::Right,
        }
    }
}

/// One-shot sounds emitted outside the proximity loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A regular objective was reached.
    ObjectiveReached,
    /// The terminal objective was reached.
    Transmission,
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// Top-level session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Menu,
    Game,
    End,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Game => "game",
            Self::End => "end",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenes the stage can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    Menu,
    Game,
}
