//! Error types for context-module resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by the external compile step.
///
/// Carried through [`ContextError::Transform`] without being reinterpreted.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransformError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>);

impl TransformError {
    /// Wrap a plain message as a transform failure.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        TransformError(message.into())
    }

    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

/// Errors surfaced to the caller of a context resolution
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Invalid context filter /{pattern}/{flags}: {reason}")]
    Configuration {
        pattern: String,
        flags: String,
        reason: String,
    },

    #[error("Context mode \"{0}\" is unsupported (expected sync, eager, lazy or lazy-once)")]
    UnsupportedMode(String),

    #[error("Context root must be an absolute path: {0}")]
    RelativeRoot(PathBuf),

    #[error("Failed to scan {root}: {reason}")]
    Scan { root: PathBuf, reason: String },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Watch error: {0}")]
    Watch(String),
}

impl From<config::ConfigError> for ContextError {
    fn from(err: config::ConfigError) -> Self {
        ContextError::ConfigError(err.to_string())
    }
}

impl From<notify::Error> for ContextError {
    fn from(err: notify::Error) -> Self {
        ContextError::Watch(err.to_string())
    }
}
