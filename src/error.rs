//! Error types for document loading, extraction, and field reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading the API schema document.
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
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
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
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while extracting fields from one HTTP operation.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("path not found in document: {path}")]
    PathNotFound { path: String },

    #[error("no {method} operation defined for {path}")]
    OperationNotFound { method: String, path: String },

    #[error("unresolvable reference \"{reference}\" at {location}")]
    UnresolvableRef { reference: String, location: String },

    #[error("invalid schema at {location}: {message}")]
    InvalidSchema { location: String, message: String },

    #[error(
        "request body of {method} {path} has no application/json content (found: {})",
        content_types.join(", ")
    )]
    UnsupportedContentType {
        method: String,
        path: String,
        content_types: Vec<String>,
    },

    #[error("empty field name at {location}")]
    EmptyFieldName { location: String },
}

impl ExtractError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Consistency faults inside the field aggregator.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("catalog has no entry for create body field \"{wire_name}\"")]
    MissingCatalogEntry { wire_name: String },
}

impl AggregateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Invalid generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("resource kind must not be empty")]
    EmptyKind,

    #[error("resource kind \"{kind}\" must start with a letter and contain only letters and digits")]
    InvalidKind { kind: String },

    #[error("resource version must not be empty")]
    EmptyVersion,

    #[error("{operation} path \"{path}\" must start with '/'")]
    InvalidPath { operation: String, path: String },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors from a full generator run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("{} field(s) have unsupported types: {}", fields.len(), fields.join(", "))]
    UnresolvedTypes { fields: Vec<String> },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Config(e) => e.exit_code(),
            GenerateError::Load(e) => e.exit_code(),
            GenerateError::Extract(e) => e.exit_code(),
            GenerateError::Aggregate(e) => e.exit_code(),
            GenerateError::UnresolvedTypes { .. } => 1,
            GenerateError::WriteError { .. } => 3,
        }
    }
}
