//! Resolved configuration types shared across crates.
//!
//! These types represent fully-validated, resolved configuration state.
//! Raw TOML deserialization structs (with `Option` fields) stay private in
//! `beacon-config`. The config loader resolves them into these types at the
//! parse boundary.
//!
//! Existence of a value is the proof of its validity.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::TierTable;

/// Valid range for the number of regular objectives in a generated scene.
pub const OBJECTIVE_COUNT_RANGE: RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidSeconds { field: &'static str, value: f32 },
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
    #[error("interference_fill_variance must be finite and >= 0 (got {0})")]
    InvalidVariance(f32),
    #[error("objective_count must be within 1..=10 (got {0})")]
    ObjectiveCount(u32),
    #[error("{field} must be finite and > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },
}

/// Convert a configured seconds value into a `Duration`.
pub fn seconds(field: &'static str, value: f32) -> Result<Duration, SettingsError> {
    Duration::try_from_secs_f32(value).map_err(|_| SettingsError::InvalidSeconds { field, value })
}

fn positive(field: &'static str, value: f32) -> Result<f32, SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SettingsError::NonPositive { field, value })
    }
}

/// Everything the proximity poller and interference jitter need.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceSettings {
    tiers: TierTable,
    interference_fill_variance: f32,
    interference_time: Duration,
    distance_check_wait_time: Duration,
    initial_distance_check_wait_time: Duration,
}

impl GuidanceSettings {
    pub fn new(
        tiers: TierTable,
        interference_fill_variance: f32,
        interference_time: Duration,
        distance_check_wait_time: Duration,
        initial_distance_check_wait_time: Duration,
    ) -> Result<Self, SettingsError> {
        if !interference_fill_variance.is_finite() || interference_fill_variance < 0.0 {
            return Err(SettingsError::InvalidVariance(interference_fill_variance));
        }
        // Zero-length repeat intervals would spin the scheduler forever.
        if interference_time.is_zero() {
            return Err(SettingsError::ZeroInterval {
                field: "interference_time",
            });
        }
        if distance_check_wait_time.is_zero() {
            return Err(SettingsError::ZeroInterval {
                field: "distance_check_wait_time",
            });
        }
        Ok(Self {
            tiers,
            interference_fill_variance,
            interference_time,
            distance_check_wait_time,
            initial_distance_check_wait_time,
        })
    }

    #[must_use]
    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    #[must_use]
    pub fn interference_fill_variance(&self) -> f32 {
        self.interference_fill_variance
    }

    #[must_use]
    pub fn interference_time(&self) -> Duration {
        self.interference_time
    }

    #[must_use]
    pub fn distance_check_wait_time(&self) -> Duration {
        self.distance_check_wait_time
    }

    #[must_use]
    pub fn initial_distance_check_wait_time(&self) -> Duration {
        self.initial_distance_check_wait_time
    }
}

impl Default for GuidanceSettings {
    fn default() -> Self {
        Self {
            tiers: TierTable::default(),
            interference_fill_variance: 0.1,
            interference_time: Duration::from_millis(50),
            distance_check_wait_time: Duration::from_secs(1),
            initial_distance_check_wait_time: Duration::from_secs(3),
        }
    }
}

/// Session state machine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay between entering `End` and the automatic return to `Menu`.
    pub end_game_delay: Duration,
    pub cursor_visible_in_game: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            end_game_delay: Duration::from_secs(5),
            cursor_visible_in_game: false,
        }
    }
}

/// Layout of a generated scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    objective_count: u8,
    spread: f32,
    reach_radius: f32,
}

impl SceneSettings {
    pub fn new(
        objective_count: u32,
        spread: f32,
        reach_radius: f32,
    ) -> Result<Self, SettingsError> {
        let objective_count = u8::try_from(objective_count)
            .ok()
            .filter(|count| OBJECTIVE_COUNT_RANGE.contains(count))
            .ok_or(SettingsError::ObjectiveCount(objective_count))?;
        Ok(Self {
            objective_count,
            spread: positive("spread", spread)?,
            reach_radius: positive("reach_radius", reach_radius)?,
        })
    }

    #[must_use]
    pub fn objective_count(&self) -> u8 {
        self.objective_count
    }

    /// Maximum distance of a regular objective from the origin.
    #[must_use]
    pub fn spread(&self) -> f32 {
        self.spread
    }

    /// How close the agent must get for an objective to count as reached.
    #[must_use]
    pub fn reach_radius(&self) -> f32 {
        self.reach_radius
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            objective_count: 5,
            spread: 80.0,
            reach_radius: 2.0,
        }
    }
}
