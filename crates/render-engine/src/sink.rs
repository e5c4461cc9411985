//! Event delivery from a running job to its host.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::transcode::JobState;

/// Receives job events. Called from the progress-draining task, so
/// implementations must be thread-safe.
pub trait EventSink: Send + Sync {
    /// Percent complete in `0.0..=100.0`, once per parsed progress line.
    fn progress(&self, percent: f64);

    /// A failure the host should show to the user.
    fn fatal(&self, message: &str);

    fn state_changed(&self, _state: &JobState) {}
}

/// Events as delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    Progress { percent: f64 },
    State { state: JobState },
    Fatal { message: String },
}

/// Forwards events, in order, to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: JobEvent) {
        // A closed receiver means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl EventSink for ChannelSink {
    fn progress(&self, percent: f64) {
        self.send(JobEvent::Progress { percent });
    }

    fn fatal(&self, message: &str) {
        self.send(JobEvent::Fatal {
            message: message.to_string(),
        });
    }

    fn state_changed(&self, state: &JobState) {
        self.send(JobEvent::State {
            state: state.clone(),
        });
    }
}

/// Logs events and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn progress(&self, percent: f64) {
        tracing::trace!(percent, "Progress event");
    }

    fn fatal(&self, message: &str) {
        tracing::error!(message, "Transcode failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_preserves_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.state_changed(&JobState::Running);
        sink.progress(10.0);
        sink.progress(20.0);
        sink.fatal("boom");

        assert_eq!(rx.try_recv().unwrap(), JobEvent::State { state: JobState::Running });
        assert_eq!(rx.try_recv().unwrap(), JobEvent::Progress { percent: 10.0 });
        assert_eq!(rx.try_recv().unwrap(), JobEvent::Progress { percent: 20.0 });
        assert_eq!(
            rx.try_recv().unwrap(),
            JobEvent::Fatal {
                message: "boom".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.progress(50.0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&JobEvent::Progress { percent: 12.5 }).unwrap();
        assert_eq!(json, r#"{"event":"progress","percent":12.5}"#);
    }
}
