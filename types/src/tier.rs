//! Proximity tiers and the validated tier table.
//!
//! Raw TOML structs stay private here; [`TierTable`] is only reachable through
//! validation, so holding one is proof that every range and ordering rule holds.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Deserialize;
use thiserror::Error;

const DISTANCE_RANGE: RangeInclusive<f32> = 0.0..=200.0;
const UNIT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
const SPEED_RANGE: RangeInclusive<f32> = 0.0..=10.0;

/// Named proximity band.
///
/// Variants are declared from least to most intense, so `Ord` compares intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierName {
    Default,
    Low,
    Medium,
    High,
}

impl TierName {
    /// Guarded tiers in the order classification checks them.
    pub const CHECK_ORDER: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TierError {
    #[error("tier `{tier}`: {field} = {value} is outside {min}..={max}")]
    OutOfRange {
        tier: TierName,
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("tier `high` distance must be greater than zero (got {0})")]
    HighThresholdNotPositive(f32),
    #[error(
        "tier `{tier}` distance {distance} must exceed tier `{previous}` distance {previous_distance}"
    )]
    NonMonotonic {
        tier: TierName,
        distance: f32,
        previous: TierName,
        previous_distance: f32,
    },
}

/// Feedback intensities attached to one proximity band. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTier {
    name: TierName,
    distance: f32,
    grain_intensity: f32,
    animator_speed: f32,
    proximity_fill: f32,
    interference_volume: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawIndicatorTier {
    distance: f32,
    grain_intensity: f32,
    animator_speed: f32,
    proximity_fill: f32,
    interference_volume: f32,
}

fn check_range(
    tier: TierName,
    field: &'static str,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<(), TierError> {
    // `contains` is false for NaN, so non-finite values are rejected here too.
    if range.contains(&value) {
        Ok(())
    } else {
        Err(TierError::OutOfRange {
            tier,
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

impl IndicatorTier {
    pub fn new(
        name: TierName,
        distance: f32,
        grain_intensity: f32,
        animator_speed: f32,
        proximity_fill: f32,
        interference_volume: f32,
    ) -> Result<Self, TierError> {
        check_range(name, "distance", distance, &DISTANCE_RANGE)?;
        check_range(name, "grain_intensity", grain_intensity, &UNIT_RANGE)?;
        check_range(name, "animator_speed", animator_speed, &SPEED_RANGE)?;
        check_range(name, "proximity_fill", proximity_fill, &UNIT_RANGE)?;
        check_range(name, "interference_volume", interference_volume, &UNIT_RANGE)?;
        Ok(Self {
            name,
            distance,
            grain_intensity,
            animator_speed,
            proximity_fill,
            interference_volume,
        })
    }

    fn from_raw(name: TierName, raw: RawIndicatorTier) -> Result<Self, TierError> {
        Self::new(
            name,
            raw.distance,
            raw.grain_intensity,
            raw.animator_speed,
            raw.proximity_fill,
            raw.interference_volume,
        )
    }

    #[must_use]
    pub fn name(&self) -> TierName {
        self.name
    }

    /// Distances strictly below this threshold select the tier.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[must_use]
    pub fn grain_intensity(&self) -> f32 {
        self.grain_intensity
    }

    #[must_use]
    pub fn animator_speed(&self) -> f32 {
        self.animator_speed
    }

    #[must_use]
    pub fn proximity_fill(&self) -> f32 {
        self.proximity_fill
    }

    #[must_use]
    pub fn interference_volume(&self) -> f32 {
        self.interference_volume
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawTierTable {
    high: RawIndicatorTier,
    medium: RawIndicatorTier,
    low: RawIndicatorTier,
    default: RawIndicatorTier,
}

/// The four configured tiers.
///
/// Invariants: every field is in range, `high.distance > 0`, and thresholds
/// strictly increase from high to default (high < medium < low < default).
/// Classification never compares against the default threshold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTierTable")]
pub struct TierTable {
    high: IndicatorTier,
    medium: IndicatorTier,
    low: IndicatorTier,
    default: IndicatorTier,
}

impl TryFrom<RawTierTable> for TierTable {
    type Error = TierError;

    fn try_from(raw: RawTierTable) -> Result<Self, Self::Error> {
        Self::new(
            IndicatorTier::from_raw(TierName::High, raw.high)?,
            IndicatorTier::from_raw(TierName::Medium, raw.medium)?,
            IndicatorTier::from_raw(TierName::Low, raw.low)?,
            IndicatorTier::from_raw(TierName::Default, raw.default)?,
        )
    }
}

impl TierTable {
    /// Assemble a table, checking the cross-tier ordering rules.
    ///
    /// Each tier is stored under the slot it was passed in; its own name is
    /// overwritten to match the slot.
    pub fn new(
        mut high: IndicatorTier,
        mut medium: IndicatorTier,
        mut low: IndicatorTier,
        mut default: IndicatorTier,
    ) -> Result<Self, TierError> {
        high.name = TierName::High;
        medium.name = TierName::Medium;
        low.name = TierName::Low;
        default.name = TierName::Default;

        if high.distance <= 0.0 {
            return Err(TierError::HighThresholdNotPositive(high.distance));
        }
        for (previous, current) in [(&high, &medium), (&medium, &low), (&low, &default)] {
            if current.distance <= previous.distance {
                return Err(TierError::NonMonotonic {
                    tier: current.name,
                    distance: current.distance,
                    previous: previous.name,
                    previous_distance: previous.distance,
                });
            }
        }

        Ok(Self {
            high,
            medium,
            low,
            default,
        })
    }

    #[must_use]
    pub fn get(&self, name: TierName) -> &IndicatorTier {
        match name {
            TierName::High => &self.high,
            TierName::Medium => &self.medium,
            TierName::Low => &self.low,
            TierName::Default => &self.default,
        }
    }

    /// Guarded tiers in check order (high, medium, low).
    pub fn guarded(&self) -> impl Iterator<Item = &IndicatorTier> {
        TierName::CHECK_ORDER.into_iter().map(|name| self.get(name))
    }

    /// The catch-all tier.
    #[must_use]
    pub fn fallback(&self) -> &IndicatorTier {
        &self.default
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let tier = |name, distance, grain_intensity, animator_speed, proximity_fill, volume| {
            IndicatorTier {
                name,
                distance,
                grain_intensity,
                animator_speed,
                proximity_fill,
                interference_volume: volume,
            }
        };
        Self {
            high: tier(TierName::High, 10.0, 0.15, 6.0, 0.9, 0.8),
            medium: tier(TierName::Medium, 30.0, 0.3, 3.0, 0.6, 0.45),
            low: tier(TierName::Low, 60.0, 0.45, 1.5, 0.35, 0.2),
            default: tier(TierName::Default, 200.0, 0.6, 0.5, 0.1, 0.0),
        }
    }
}
