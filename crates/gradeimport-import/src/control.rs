//! Pause and cancel handles for a running import.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Cloneable handle controlling an import run from other tasks.
///
/// Requests are observed between batches, and in parallel mode also
/// before each row is dispatched.
#[derive(Debug, Clone)]
pub struct ImportControl {
    cancel: CancellationToken,
    paused: Arc<watch::Sender<bool>>,
}

impl Default for ImportControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportControl {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            cancel: CancellationToken::new(),
            paused: Arc::new(paused),
        }
    }

    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Cancellation is final; a cancelled run cannot resume.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait until the run is resumed. Returns `false` if it was cancelled instead.
    pub async fn wait_for_resume(&self) -> bool {
        let mut paused = self.paused.subscribe();
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            if !*paused.borrow_and_update() {
                return true;
            }
            tokio::select! {
                () = self.cancel.cancelled() => return false,
                changed = paused.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                }
            }
        }
    }
}
