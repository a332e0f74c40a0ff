//! Import progress tracking and the import status state machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// Lifecycle of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    #[default]
    Pending,
    Importing,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Importing => "importing",
            ImportStatus::Paused => "paused",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
            ImportStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportStatus::Completed | ImportStatus::Failed | ImportStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: ImportStatus) -> bool {
        use ImportStatus::{Cancelled, Completed, Failed, Importing, Paused, Pending};
        matches!(
            (*self, next),
            (Pending, Importing)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Importing, Paused)
                | (Paused, Importing)
                | (Importing, Completed)
                | (Importing, Failed)
                | (Paused, Failed)
                | (Importing, Cancelled)
                | (Paused, Cancelled)
        )
    }

    pub fn transition(self, next: ImportStatus) -> Result<ImportStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live counters of an import run. Owned by the orchestrator; readers get clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// 1-based index of the batch being (or last) processed; 0 before the first.
    pub current_batch: usize,
    pub total_batches: usize,
    pub status: ImportStatus,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportProgress {
    pub fn new(total: usize, total_batches: usize) -> Self {
        Self {
            total,
            total_batches,
            ..Self::default()
        }
    }

    pub fn set_status(&mut self, next: ImportStatus) -> Result<(), TransitionError> {
        self.status = self.status.transition(next)?;
        Ok(())
    }

    /// Fraction of rows processed, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }
}

/// Frozen outcome of an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    pub status: ImportStatus,
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_batches: usize,
    pub completed_batches: usize,
    pub elapsed_ms: u64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportResult {
    pub fn from_progress(
        progress: &ImportProgress,
        exam_id: Option<String>,
        completed_batches: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            exam_id,
            status: progress.status,
            total: progress.total,
            processed: progress.processed,
            successful: progress.successful,
            failed: progress.failed,
            skipped: progress.skipped,
            total_batches: progress.total_batches,
            completed_batches,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            errors: progress.errors.clone(),
            warnings: progress.warnings.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ImportStatus::Completed && self.failed == 0
    }
}
