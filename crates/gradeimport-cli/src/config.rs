//! Loading configuration documents named on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use gradeimport_model::{EngineConfig, EngineError, ExternalSuggestion};
use gradeimport_standards::{SchemaError, SchemaRegistry};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] EngineError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Engine configuration from `path`, or the defaults.
///
/// Missing keys fall back to their defaults; the result is validated.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let config = match path {
        Some(path) => read_json::<EngineConfig>(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Schema registry from `path`, or the built-in exam schema.
pub fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry, ConfigError> {
    match path {
        Some(path) => Ok(SchemaRegistry::from_path(path)?),
        None => Ok(SchemaRegistry::standard()),
    }
}

/// Suggested mapping from `path`; `confidence` replaces the stated one.
pub fn load_suggestion(
    path: &Path,
    confidence: Option<f64>,
) -> Result<ExternalSuggestion, ConfigError> {
    let mut suggestion: ExternalSuggestion = read_json(path)?;
    if confidence.is_some() {
        suggestion.confidence = confidence;
    }
    Ok(suggestion)
}
