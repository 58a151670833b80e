//! Error types for document loading, workspace discovery and flattening.
//!
//! Merge conflicts are not errors; see [`MergeConflict`](crate::MergeConflict).

use std::path::PathBuf;
use thiserror::Error;

use crate::location::Location;

/// Errors while reading a YAML/JSON document.
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

    // Parse errors (exit code 2)
    #[error("invalid document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid document: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::Parse { .. } | LoadError::InvalidYaml { .. } => 2,
        }
    }
}

/// Errors while discovering workspaces and building the reference registry.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no jsmn-forge config found in {path}")]
    MissingConfig { path: PathBuf },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid config {path}: {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidConfig {
        path: PathBuf,
        errors: Vec<SchemaError>,
    },

    #[error("malformed config {path}: {source}")]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid $id \"{id}\" in {path}")]
    InvalidIdentity { path: PathBuf, id: String },

    #[error("duplicate $id \"{id}\" in {path}")]
    DuplicateIdentity { path: PathBuf, id: String },

    #[error("document {path} is not a mapping")]
    NotAMapping { path: PathBuf },
}

impl WorkspaceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkspaceError::ReadDir { .. } | WorkspaceError::MissingConfig { .. } => 3,
            WorkspaceError::Load(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A schema that cannot be lowered to the struct IR.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[error("{location}: {message}")]
pub struct FlattenError {
    pub location: Location,
    pub message: String,
}

impl FlattenError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}
