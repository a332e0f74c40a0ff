//! Progress observers.

use gradeimport_model::{ImportProgress, ImportResult};
use tokio::sync::mpsc::UnboundedSender;

/// Receives progress snapshots while an import runs.
///
/// Called on the import task; implementations should return quickly.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &ImportProgress);

    fn on_complete(&self, _result: &ImportResult) {}
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_progress(&self, _progress: &ImportProgress) {}
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(&ImportProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &ImportProgress) {
        (self.0)(progress);
    }
}

/// Notification forwarded by a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress(ImportProgress),
    Complete(ImportResult),
}

/// Forwards snapshots over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, progress: &ImportProgress) {
        // a dropped receiver only means nobody is watching
        let _ = self.sender.send(ProgressEvent::Progress(progress.clone()));
    }

    fn on_complete(&self, result: &ImportResult) {
        let _ = self.sender.send(ProgressEvent::Complete(result.clone()));
    }
}
