//! Feedback emitted toward the audio/visual layer.
//!
//! Every emission is fire-and-forget. Sinks only implement [`FeedbackSink::emit`];
//! the named operations are provided on top of it.

use beacon_types::{Cue, Direction, ObjectiveId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackEvent {
    GrainIntensity(f32),
    Indicator { speed: f32, fill: f32 },
    Interference { volume: f32 },
    Direction(Direction),
    Reveal(ObjectiveId),
    Cue(Cue),
}

pub trait FeedbackSink {
    fn emit(&mut self, event: FeedbackEvent);

    fn set_grain_intensity(&mut self, intensity: f32) {
        self.emit(FeedbackEvent::GrainIntensity(intensity));
    }

    fn set_indicator(&mut self, speed: f32, fill: f32) {
        self.emit(FeedbackEvent::Indicator { speed, fill });
    }

    fn play_interference(&mut self, volume: f32) {
        self.emit(FeedbackEvent::Interference { volume });
    }

    fn report_direction(&mut self, direction: Direction) {
        self.emit(FeedbackEvent::Direction(direction));
    }

    fn reveal_objective(&mut self, id: ObjectiveId) {
        self.emit(FeedbackEvent::Reveal(id));
    }

    fn play_cue(&mut self, cue: Cue) {
        self.emit(FeedbackEvent::Cue(cue));
    }
}

/// Recording sink.
impl FeedbackSink for Vec<FeedbackEvent> {
    fn emit(&mut self, event: FeedbackEvent) {
        self.push(event);
    }
}

/// Discards everything.
impl FeedbackSink for () {
    fn emit(&mut self, _event: FeedbackEvent) {}
}
