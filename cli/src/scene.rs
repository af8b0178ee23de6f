//! Generated scene layout and the stage that loads it.

use std::f32::consts::TAU;

use beacon_core::{ObjectiveRegistry, RegistryError, Stage};
use beacon_types::{Objective, ObjectiveId, Scene, SceneSettings, Vec3};

/// Regular objectives never spawn closer than this fraction of the spread.
const MIN_RADIUS_FRACTION: f32 = 0.2;

/// The terminal objective sits this far out, relative to the spread.
const TERMINAL_RADIUS_FRACTION: f32 = 1.25;

/// Objective positions for one scene. The terminal objective comes last.
#[derive(Debug, Clone)]
pub struct Layout {
    objectives: Vec<Objective>,
}

impl Layout {
    #[must_use]
    pub fn generate(settings: &SceneSettings) -> Self {
        let spread = settings.spread();
        let count = u32::from(settings.objective_count());

        let mut objectives: Vec<Objective> = (1..=count)
            .map(|n| {
                let radius = spread * (MIN_RADIUS_FRACTION + (1.0 - MIN_RADIUS_FRACTION) * unit().sqrt());
                Objective::new(ObjectiveId::new(n), on_circle(radius))
            })
            .collect();
        objectives.push(Objective::terminal(
            ObjectiveId::new(count + 1),
            on_circle(spread * TERMINAL_RADIUS_FRACTION),
        ));

        Self { objectives }
    }

    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }
}

fn unit() -> f32 {
    rand::random::<f32>()
}

fn on_circle(radius: f32) -> Vec3 {
    let (sin, cos) = (unit() * TAU).sin_cos();
    Vec3::new(radius * cos, 0.0, radius * sin)
}

/// Stage backed by a fixed [`Layout`]. Every game load starts from a fresh,
/// fully unresolved copy.
#[derive(Debug)]
pub struct SimulatedStage {
    layout: Layout,
    scene: Scene,
}

impl SimulatedStage {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            scene: Scene::Menu,
        }
    }
}

impl Stage for SimulatedStage {
    fn load_game(&mut self) -> Result<ObjectiveRegistry, RegistryError> {
        let registry = ObjectiveRegistry::new(self.layout.objectives().to_vec())?;
        self.scene = Scene::Game;
        tracing::info!(scene = ?self.scene, objectives = registry.remaining(), "Scene loaded");
        Ok(registry)
    }

    fn load_menu(&mut self) {
        self.scene = Scene::Menu;
        tracing::info!(scene = ?self.scene, "Scene loaded");
    }
}
