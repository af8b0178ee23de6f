//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use beacon_core::{AgentPose, ObjectiveRegistry, RegistryError, Stage};
use beacon_types::{IndicatorTier, Objective, ObjectiveId, TierName, TierTable, Vec3};

/// Tiers with thresholds at 10, 30 and 60 and distinct volumes per band.
pub fn scenario_tiers() -> TierTable {
    let tier = |name, distance, grain, speed, fill, volume| {
        IndicatorTier::new(name, distance, grain, speed, fill, volume).expect("valid tier")
    };
    TierTable::new(
        tier(TierName::High, 10.0, 0.1, 4.0, 0.9, 0.8),
        tier(TierName::Medium, 30.0, 0.3, 2.0, 0.6, 0.5),
        tier(TierName::Low, 60.0, 0.5, 1.0, 0.3, 0.2),
        tier(TierName::Default, 200.0, 0.7, 0.5, 0.1, 0.0),
    )
    .expect("valid table")
}

pub fn id(raw: u32) -> ObjectiveId {
    ObjectiveId::new(raw)
}

/// Agent at `(x, 0, z)` facing +z with probes one unit out.
pub fn pose(x: f32, z: f32) -> AgentPose {
    AgentPose::new(Vec3::new(x, 0.0, z), 0.0, 1.0)
}

pub fn registry(objectives: Vec<Objective>) -> ObjectiveRegistry {
    ObjectiveRegistry::new(objectives).expect("valid registry")
}

/// Stage with a fixed objective list that counts scene loads.
#[derive(Debug, Default)]
pub struct ScriptedStage {
    pub objectives: Vec<Objective>,
    pub game_loads: usize,
    pub menu_loads: usize,
}

impl ScriptedStage {
    pub fn new(objectives: Vec<Objective>) -> Self {
        Self {
            objectives,
            ..Self::default()
        }
    }
}

impl Stage for ScriptedStage {
    fn load_game(&mut self) -> Result<ObjectiveRegistry, RegistryError> {
        self.game_loads += 1;
        ObjectiveRegistry::new(self.objectives.clone())
    }

    fn load_menu(&mut self) {
        self.menu_loads += 1;
    }
}

/// One regular objective at `(0, 0, 20)` and the terminal at `(-45, 0, 0)`.
pub fn two_objectives() -> Vec<Objective> {
    vec![
        Objective::new(id(1), Vec3::new(0.0, 0.0, 20.0)),
        Objective::terminal(id(9), Vec3::new(-45.0, 0.0, 0.0)),
    ]
}

pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, content).expect("write config");
    path
}

/// Fast timings so scenarios finish in a handful of virtual seconds.
pub const FAST_CONFIG: &str = r"
[guidance]
interference_fill_variance = 0.05
interference_time = 0.1
distance_check_wait_time = 0.5
initial_distance_check_wait_time = 1.0

[session]
end_game_delay = 2.0
";
