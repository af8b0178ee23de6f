//! Interference jitter: wobbles the proximity fill around the current tier's
//! nominal value.

use beacon_types::TierTable;

use crate::feedback::FeedbackSink;
use crate::guidance::GuidanceState;

/// Source of uniform samples in `[0, 1]`.
pub trait JitterSource {
    fn unit(&mut self) -> f32;
}

/// Thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadJitter;

impl JitterSource for ThreadJitter {
    fn unit(&mut self) -> f32 {
        rand::random::<f32>()
    }
}

/// Replays a fixed sequence, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceJitter {
    values: Vec<f32>,
    next: usize,
}

impl SequenceJitter {
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, next: 0 }
    }
}

impl JitterSource for SequenceJitter {
    fn unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.wrapping_add(1);
        value
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InterferenceJitter {
    variance: f32,
}

impl InterferenceJitter {
    #[must_use]
    pub fn new(variance: f32) -> Self {
        Self { variance }
    }

    /// One jitter cycle. Does nothing until the poller has set a tier.
    ///
    /// The fill is drawn uniformly from `[fill - variance, fill + variance]`
    /// and may leave `[0, 1]`.
    pub fn tick(
        &self,
        state: &GuidanceState,
        tiers: &TierTable,
        source: &mut dyn JitterSource,
        sink: &mut dyn FeedbackSink,
    ) -> Option<f32> {
        let tier = tiers.get(state.current_tier()?);
        let low = tier.proximity_fill() - self.variance;
        let high = tier.proximity_fill() + self.variance;
        let unit = source.unit().clamp(0.0, 1.0);
        let fill = (low + (high - low) * unit).clamp(low, high);
        sink.set_indicator(tier.animator_speed(), fill);
        tracing::trace!(tier = %tier.name(), fill, "Interference jitter");
        Some(fill)
    }
}
