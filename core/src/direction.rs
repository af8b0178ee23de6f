//! Direction reporter and the agent's measuring probes.

use std::ops::Deref;

use thiserror::Error;

use beacon_types::{Direction, ProbeKind, Vec3};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("probe set must not be empty")]
    Empty,
}

/// A measuring point fixed relative to the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub kind: ProbeKind,
    pub position: Vec3,
}

/// Non-empty list of probes in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSet(Vec<Probe>);

impl ProbeSet {
    pub fn new(probes: Vec<Probe>) -> Result<Self, ProbeError> {
        if probes.is_empty() {
            return Err(ProbeError::Empty);
        }
        Ok(Self(probes))
    }

    /// Front/back/left/right probes at `offset` from `center`, oriented by `yaw`
    /// (radians about the vertical axis, zero facing +z).
    #[must_use]
    pub fn around(center: Vec3, yaw: f32, offset: f32) -> Self {
        let (sin, cos) = yaw.sin_cos();
        let forward = Vec3::new(sin, 0.0, cos);
        let right = Vec3::new(cos, 0.0, -sin);
        let probes = ProbeKind::ALL
            .into_iter()
            .map(|kind| {
                let axis = match kind {
                    ProbeKind::Front => forward,
                    ProbeKind::Back => forward * -1.0,
                    ProbeKind::Left => right * -1.0,
                    ProbeKind::Right => right,
                };
                Probe {
                    kind,
                    position: center + axis * offset,
                }
            })
            .collect();
        Self(probes)
    }
}

impl Deref for ProbeSet {
    type Target = [Probe];

    fn deref(&self) -> &[Probe] {
        &self.0
    }
}

/// Map the probe closest to `point` to a direction signal.
///
/// Strict less-than: the earlier probe wins a tie. An empty slice yields
/// `Direction::None`.
#[must_use]
pub fn nearest_direction(probes: &[Probe], point: Vec3) -> Direction {
    let mut best: Option<(f32, ProbeKind)> = None;
    for probe in probes {
        let distance = probe.position.distance(point);
        if best.is_none_or(|(closest, _)| distance < closest) {
            best = Some((distance, probe.kind));
        }
    }
    best.map_or(Direction::None, |(_, kind)| kind.direction())
}
