//! The agent as seen by the guidance loop.

use beacon_types::Vec3;

use crate::direction::ProbeSet;

/// Read-only view of the player-controlled agent.
pub trait Agent {
    fn position(&self) -> Vec3;

    /// Probe positions in world space, in enumeration order.
    fn probes(&self) -> &ProbeSet;
}

/// Snapshot of the agent's position and probes.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPose {
    position: Vec3,
    probes: ProbeSet,
}

impl AgentPose {
    /// Pose with the standard four probes at `probe_offset` around `position`.
    #[must_use]
    pub fn new(position: Vec3, yaw: f32, probe_offset: f32) -> Self {
        Self {
            position,
            probes: ProbeSet::around(position, yaw, probe_offset),
        }
    }
}

impl Agent for AgentPose {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn probes(&self) -> &ProbeSet {
        &self.probes
    }
}
