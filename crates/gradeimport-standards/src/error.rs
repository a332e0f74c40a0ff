#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("schema has no fields")]
    Empty,

    #[error("duplicate field key in schema: {key}")]
    DuplicateKey { key: String },

    #[error("invalid field key in schema: {key:?} ({message})")]
    InvalidKey { key: String, message: String },

    #[error("schema must define a critical `{key}` field")]
    MissingPrimary { key: String },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
