//! Domain error types
//!
//! Two layers of errors exist in Lectern:
//!
//! - [`LecternError`] aborts a whole call (bad configuration, invalid jobs).
//! - [`ExportError`] is captured per export or per job and surfaced as data
//!   in the batch result, never propagated past the job boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main Lectern error type
///
/// This is the primary error type for operations that fail as a whole.
#[derive(Debug, Error)]
pub enum LecternError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A job failed up-front validation; nothing was executed
    #[error("ValidationError: job '{job_id}': {reason}")]
    Validation { job_id: String, reason: String },

    /// Export process errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl LecternError {
    /// Builds a validation error for the given job
    pub fn validation(job_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            job_id: job_id.into(),
            reason: reason.into(),
        }
    }
}

/// Runtime export errors
///
/// These never abort a batch. The executor records them on the
/// corresponding `ExportResult` or `JobResult`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExportError {
    /// A referenced session does not exist in the session store
    #[error("SessionNotFoundError: session '{0}' not found")]
    SessionNotFound(String),

    /// The format converter failed
    #[error("ConversionError: {format} conversion failed: {message}")]
    Conversion { format: String, message: String },

    /// Writing the output failed or the path was refused
    #[error("IOError: {0}")]
    Io(String),

    /// An output name could not be produced
    #[error("NamingError: {0}")]
    Naming(#[from] NamingError),
}

impl ExportError {
    /// Builds a conversion error for a format
    pub fn conversion(format: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Conversion {
            format: format.to_string(),
            message: message.into(),
        }
    }

    /// Returns the error kind label for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionNotFound(_) => ErrorKind::SessionNotFound,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Io(_) => ErrorKind::Io,
            Self::Naming(_) => ErrorKind::Naming,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

/// Output naming errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NamingError {
    /// A custom pattern referenced a placeholder that has no value
    #[error("unresolved placeholder '{{{0}}}' in pattern '{1}'")]
    UnresolvedPlaceholder(String, String),

    /// A custom pattern produced an empty file name
    #[error("pattern '{0}' produced an empty file name")]
    EmptyName(String),
}

/// Error kind recorded in results and manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad job configuration
    Validation,
    /// Referenced session does not exist
    SessionNotFound,
    /// Format converter failure
    Conversion,
    /// Filesystem failure
    Io,
    /// Output name resolution failure
    Naming,
    /// Job never started because the batch halted
    Skipped,
    /// Job crashed unexpectedly
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "ValidationError",
            Self::SessionNotFound => "SessionNotFoundError",
            Self::Conversion => "ConversionError",
            Self::Io => "IOError",
            Self::Naming => "NamingError",
            Self::Skipped => "Skipped",
            Self::Internal => "InternalError",
        };
        f.write_str(label)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for LecternError {
    fn from(err: std::io::Error) -> Self {
        LecternError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for LecternError {
    fn from(err: serde_json::Error) -> Self {
        LecternError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for LecternError {
    fn from(err: toml::de::Error) -> Self {
        LecternError::Configuration(format!("TOML parse error: {err}"))
    }
}
