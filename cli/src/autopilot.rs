//! Headless agent: walks toward the tracked point and reports what it touches.

use std::collections::HashSet;
use std::time::Duration;

use beacon_core::AgentPose;
use beacon_engine::GuidanceSnapshot;
use beacon_types::{ObjectiveId, SceneSettings, SessionState, Vec3};

use crate::scene::Layout;

/// Units per second.
const WALK_SPEED: f32 = 12.0;

const PROBE_OFFSET: f32 = 1.0;

/// Result of one autopilot step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub pose: AgentPose,
    /// Objectives reached during this step, each reported once per session.
    pub reached: Vec<ObjectiveId>,
}

#[derive(Debug)]
pub struct Autopilot {
    layout: Layout,
    reach_radius: f32,
    position: Vec3,
    yaw: f32,
    reached: HashSet<ObjectiveId>,
}

impl Autopilot {
    #[must_use]
    pub fn new(layout: Layout, scene: &SceneSettings) -> Self {
        Self {
            layout,
            reach_radius: scene.reach_radius(),
            position: Vec3::ZERO,
            yaw: 0.0,
            reached: HashSet::new(),
        }
    }

    #[must_use]
    pub fn pose(&self) -> AgentPose {
        AgentPose::new(self.position, self.yaw, PROBE_OFFSET)
    }

    /// Move for `dt` toward the snapshot's tracked point.
    ///
    /// Stands still outside `Game` and before the first poll. The terminal
    /// objective only counts once it has been revealed.
    pub fn step(&mut self, snapshot: &GuidanceSnapshot, dt: Duration) -> Step {
        if snapshot.session != SessionState::Game {
            return Step {
                pose: self.pose(),
                reached: Vec::new(),
            };
        }

        if let Some(target) = snapshot.nearest_point {
            let next = self
                .position
                .move_towards(target, WALK_SPEED * dt.as_secs_f32());
            let heading = next - self.position;
            if heading.length() > f32::EPSILON {
                self.yaw = heading.x.atan2(heading.z);
            }
            self.position = next;
        }

        let reached: Vec<ObjectiveId> = self
            .layout
            .objectives()
            .iter()
            .filter(|o| !o.is_terminal() || snapshot.terminal_revealed)
            .filter(|o| !self.reached.contains(&o.id()))
            .filter(|o| self.position.distance(o.position()) <= self.reach_radius)
            .map(|o| o.id())
            .collect();
        self.reached.extend(reached.iter().copied());

        Step {
            pose: self.pose(),
            reached,
        }
    }
}
