//! Proximity poller: the single writer of [`GuidanceState`].
//!
//! One cycle finds the nearest unresolved objective (falling back to the
//! terminal objective once every regular one is resolved), classifies the
//! distance, and emits feedback for the selected tier.

use beacon_types::{Direction, IndicatorTier, ObjectiveId, TierName, TierTable, Vec3};

use crate::agent::Agent;
use crate::classifier::{classify, reports_direction};
use crate::direction::nearest_direction;
use crate::feedback::FeedbackSink;
use crate::registry::ObjectiveRegistry;

/// Mutable guidance state, written only by [`ProximityPoller`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidanceState {
    current_tier: Option<TierName>,
    nearest_point: Vec3,
    suppress_direction: bool,
}

impl GuidanceState {
    /// `None` until the poller has completed a cycle.
    #[must_use]
    pub fn current_tier(&self) -> Option<TierName> {
        self.current_tier
    }

    #[must_use]
    pub fn nearest_point(&self) -> Vec3 {
        self.nearest_point
    }

    #[must_use]
    pub fn suppress_direction(&self) -> bool {
        self.suppress_direction
    }
}

/// What a poll cycle found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    Tracking {
        target: ObjectiveId,
        terminal: bool,
        distance: f32,
        tier: TierName,
    },
    /// Every objective, terminal included, is resolved.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ProximityPoller {
    tiers: TierTable,
    state: GuidanceState,
}

impl ProximityPoller {
    #[must_use]
    pub fn new(tiers: TierTable) -> Self {
        Self {
            tiers,
            state: GuidanceState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &GuidanceState {
        &self.state
    }

    #[must_use]
    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    #[must_use]
    pub fn current_tier(&self) -> Option<&IndicatorTier> {
        self.state.current_tier.map(|name| self.tiers.get(name))
    }

    /// Run one poll cycle.
    pub fn poll(
        &mut self,
        registry: &mut ObjectiveRegistry,
        agent: &dyn Agent,
        sink: &mut dyn FeedbackSink,
    ) -> PollOutcome {
        let from = agent.position();
        let nearest = registry.nearest_unresolved(from);
        let available = nearest.is_some();

        let (target, terminal, distance, point) = match nearest {
            Some(nearest) => (nearest.id, false, nearest.distance, nearest.position),
            None if !registry.terminal().is_resolved() => {
                if registry.reveal_terminal() {
                    tracing::info!(id = %registry.terminal().id(), "Revealing terminal objective");
                    sink.reveal_objective(registry.terminal().id());
                }
                let terminal = registry.terminal();
                (
                    terminal.id(),
                    true,
                    from.distance(terminal.position()),
                    terminal.position(),
                )
            }
            None => {
                self.state.suppress_direction = true;
                sink.report_direction(Direction::None);
                tracing::info!("All objectives resolved");
                return PollOutcome::Exhausted;
            }
        };

        let tier = classify(distance, &self.tiers);
        let name = tier.name();
        self.state.current_tier = Some(name);
        self.state.nearest_point = point;

        sink.set_grain_intensity(tier.grain_intensity());
        sink.set_indicator(tier.animator_speed(), tier.proximity_fill());
        if name != TierName::Default {
            sink.play_interference(tier.interference_volume());
        }

        tracing::debug!(
            closest_distance = distance,
            objectives_available = available,
            tier = %name,
            "Proximity poll"
        );

        let check_direction = reports_direction(name);
        self.state.suppress_direction = !check_direction;
        if check_direction {
            sink.report_direction(nearest_direction(agent.probes(), point));
        } else {
            sink.report_direction(Direction::None);
        }

        PollOutcome::Tracking {
            target,
            terminal,
            distance,
            tier: name,
        }
    }

    /// On-demand direction hint for the movement subsystem.
    ///
    /// Emits and returns a signal only when a tier is established and
    /// direction reporting is not suppressed.
    pub fn report_direction(
        &self,
        agent: &dyn Agent,
        sink: &mut dyn FeedbackSink,
    ) -> Option<Direction> {
        if self.state.current_tier.is_none() || self.state.suppress_direction {
            return None;
        }
        let direction = nearest_direction(agent.probes(), self.state.nearest_point);
        tracing::debug!(%direction, "Direction requested");
        sink.report_direction(direction);
        Some(direction)
    }
}
