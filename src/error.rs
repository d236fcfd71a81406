//! Error types for the cache step
//!
//! All modules use `StepResult<T>` as their return type. Errors never
//! escape the phase entry points: `run` folds them into the returned
//! `CacheResult`, `post_run` logs and swallows them.

use thiserror::Error;

/// Result type alias for cache step operations
pub type StepResult<T> = Result<T, StepError>;

/// All errors that can occur in the cache step
#[derive(Error, Debug)]
pub enum StepError {
    /// One or more required fields missing after resolution.
    ///
    /// Carries every violation found, not just the first, so a single
    /// report shows the operator everything to fix.
    #[error("{}", .0.join("\n"))]
    Configuration(Vec<String>),

    /// Credential schema validation or acquisition failed
    #[error("{0}")]
    Credential(String),

    /// A gateway operation (existence check, download, upload) failed
    #[error("{operation} failed: {reason}")]
    Transfer { operation: String, reason: String },

    /// Spawning the transfer tool itself failed
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StepError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a transfer error for a named gateway operation
    pub fn transfer(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transfer {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Check whether the error occurred before any network call
    pub fn is_pre_transfer(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Credential(_))
    }
}
