//! Progress and log events of a run.

use shared_types::RunEvent;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Sending half of a run's event stream.
///
/// Clones share the same progress high-water mark, so reported progress never goes down no
/// matter which clone reports it. Events sent after the receiver is gone are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<RunEvent>>,
    progress: Arc<AtomicU8>,
}

impl EventSink {
    pub fn channel() -> (Self, UnboundedReceiver<RunEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = Self {
            sender: Some(sender),
            progress: Arc::new(AtomicU8::new(0)),
        };
        (sink, receiver)
    }

    /// A sink that only traces.
    pub fn disabled() -> Self {
        Self::default()
    }

    fn send(&self, event: RunEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(target: "loan_recon::events", "{}", message);
        self.send(RunEvent::Log { message });
    }

    /// Reports `value` percent (rounded, clamped to 0..=100, never below an earlier report).
    pub fn progress(&self, value: f64, status: impl Into<String>) {
        let value = if value.is_finite() {
            value.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        let previous = self.progress.fetch_max(value, Ordering::SeqCst);
        let value = previous.max(value);
        let status = status.into();

        tracing::debug!(target: "loan_recon::events", "[{}%] {}", value, status);
        self.send(RunEvent::Progress {
            value,
            status: Some(status),
        });
    }

    pub fn current_progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }
}
