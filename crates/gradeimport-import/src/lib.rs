//! Batched import of validated exam scores.
//!
//! [`ImportOrchestrator`] writes records through an [`ImportStore`] in
//! ordered batches, resolving students with a [`StudentResolver`] and
//! reporting through a [`ProgressSink`]. Runs can be paused, resumed and
//! cancelled through an [`ImportControl`].

#![deny(unsafe_code)]

pub mod batch;
pub mod control;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod sink;
pub mod store;

pub use batch::{batch_count, batch_ranges};
pub use control::ImportControl;
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, NAME_MATCH_CONFIDENCE, StoredStudent};
pub use orchestrator::{ImportOrchestrator, RowOutcome, detect_mode};
pub use sink::{ChannelSink, FnSink, NoopSink, ProgressEvent, ProgressSink};
pub use store::{
    GradeKey, GradeRow, ImportStore, MatchKind, StudentMatch, StudentQuery, StudentResolver,
};
