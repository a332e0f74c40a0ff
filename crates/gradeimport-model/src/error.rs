use thiserror::Error;

use crate::progress::ImportStatus;

/// Unrecoverable setup errors.
///
/// These are the only failures that cross a public entry point. Mapping
/// ambiguity, row problems and persistence failures are reported inside
/// result objects instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("the uploaded sheet has no header row")]
    NoHeaders,
    #[error("the uploaded sheet has headers but no data rows")]
    NoDataRows,
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl EngineError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors from editing a column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Target key is neither a schema field nor a `custom_` key.
    #[error("unknown target field: {0}")]
    UnknownTarget(String),
    /// Header is not part of the upload.
    #[error("column not found: {0}")]
    HeaderNotFound(String),
    /// Target already claimed by another header.
    #[error("target '{target}' already mapped from column '{header}'")]
    TargetAlreadyMapped { target: String, header: String },
}

/// Illegal import status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move import from {from} to {to}")]
pub struct TransitionError {
    pub from: ImportStatus,
    pub to: ImportStatus,
}

pub type Result<T> = std::result::Result<T, EngineError>;
