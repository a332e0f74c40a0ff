#![deny(unsafe_code)]

pub mod analyzer;
pub mod classifier;
pub mod engine;
pub mod matcher;
pub mod strategies;
pub mod utils;

pub use analyzer::{MissingFieldAnalysis, analyze};
pub use classifier::{Classification, classify, column_samples};
pub use engine::{LadderThresholds, ResolutionEngine, UNASSIGNED_CLASS};
pub use matcher::{DEFAULT_MATCH_THRESHOLD, MatchResult, best_match, match_header};
pub use strategies::{Candidate, LADDER, LadderInput};
pub use utils::normalize_text;
