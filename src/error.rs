//! Error types for nimprofile
//!
//! Parsing is the only fallible part of the library. Matching never fails:
//! a profile that does not fit a request is simply left out of the result.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nimprofile operations
#[derive(Error, Debug)]
pub enum NimProfileError {
    /// I/O error while reading a manifest or model spec
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The manifest document is not well-formed
    #[error("Failed to parse manifest: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The model spec file or flags could not be turned into a ModelSpec
    #[error("Invalid model spec: {0}")]
    SpecError(String),

    /// A profile id requested by the caller is not in the manifest
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Rendering output failed
    #[error("Output error: {0}")]
    Output(String),
}

impl NimProfileError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a model spec error
    pub fn spec(message: impl Into<String>) -> Self {
        Self::SpecError(message.into())
    }

    /// Check if this error may go away on a later attempt (e.g. next reconcile)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for nimprofile operations
pub type Result<T> = std::result::Result<T, NimProfileError>;

impl From<serde_yaml::Error> for NimProfileError {
    fn from(err: serde_yaml::Error) -> Self {
        NimProfileError::Parse(err)
    }
}

impl From<serde_json::Error> for NimProfileError {
    fn from(err: serde_json::Error) -> Self {
        NimProfileError::Output(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| NimProfileError::io(path, e))
    }
}
