use tokio::sync::mpsc;

use beacon_core::{FeedbackEvent, FeedbackSink};

/// Forwards feedback onto an unbounded channel.
///
/// Emission never blocks. Events are dropped once the receiver is gone, so a
/// consumer that stops listening should drop its receiver rather than hold it
/// undrained.
#[derive(Debug, Clone)]
pub struct ChannelFeedback {
    tx: mpsc::UnboundedSender<FeedbackEvent>,
}

impl ChannelFeedback {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<FeedbackEvent>) -> Self {
        Self { tx }
    }

    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FeedbackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl FeedbackSink for ChannelFeedback {
    fn emit(&mut self, event: FeedbackEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!(?event, "Feedback receiver closed");
        }
    }
}
