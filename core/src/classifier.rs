//! Distance classification.
//!
//! The tier table is scanned once, high to low, and the first tier whose
//! threshold exceeds the distance wins. Anything past every threshold
//! (including NaN) falls through to the default tier.

use beacon_types::{IndicatorTier, TierName, TierTable};

#[must_use]
pub fn classify(distance: f32, tiers: &TierTable) -> &IndicatorTier {
    tiers
        .guarded()
        .find(|tier| distance < tier.distance())
        .unwrap_or_else(|| tiers.fallback())
}

/// Whether the direction reporter runs for a tier.
///
/// True in the low/default band, false in the medium/high band where the
/// agent is close enough that a hint is redundant.
#[must_use]
pub fn reports_direction(tier: TierName) -> bool {
    matches!(tier, TierName::Low | TierName::Default)
}
