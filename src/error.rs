//! Error types for document loading and operation selection.
//!
//! Compilation itself is total; only getting a document in, or picking an
//! operation out of it, can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading an OpenAPI document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid document: not JSON ({json}) and not YAML ({yaml})")]
    InvalidDocument {
        json: serde_json::Error,
        yaml: serde_yaml::Error,
    },

    #[error("invalid document: expected an object at the top level, found {actual}")]
    NotAMapping { actual: &'static str },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidDocument { .. } | LoadError::NotAMapping { .. } => 2,
        }
    }
}

/// Errors while producing compiled output.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no operation matches \"{selector}\" (expected an operationId or \"METHOD /path\")")]
    OperationNotFound { selector: String },
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Load(e) => e.exit_code(),
            GenerateError::OperationNotFound { .. } => 2,
        }
    }
}
