use thiserror::Error;

/// Failures reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Temporary failure; a retry may succeed.
    #[error("transient store failure: {0}")]
    Transient(String),
    /// The store refused the data.
    #[error("rejected by store: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
