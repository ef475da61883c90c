//! Collaborator traits
//!
//! The orchestrator talks to the outside world only through these traits.
//! Implementations must be safe to call from several workers at once.

use crate::domain::{ConversionOptions, Document, ExportError, ExportFormat, SessionId};
use async_trait::async_trait;
use std::path::Path;

/// Read-only lookup of session content
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the content of a session
    ///
    /// # Errors
    ///
    /// Returns `ExportError::SessionNotFound` if the session does not exist.
    async fn get_session_content(&self, session_id: &SessionId) -> Result<Document, ExportError>;
}

/// Turns a document into bytes in a specific output format
#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Convert a document
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Conversion` if rendering fails.
    async fn convert(
        &self,
        document: &Document,
        format: ExportFormat,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, ExportError>;
}

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Bytes written to disk (after compression)
    pub size: u64,

    /// SHA-256 of the bytes written to disk, hex encoded
    pub checksum: String,
}

/// Writes export output under a root directory
#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Write `bytes` to `path`, gzip-compressing them when `compress` is set
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Io` if `path` lies outside `root`, the file
    /// already exists, or the write fails.
    async fn write(
        &self,
        root: &Path,
        path: &Path,
        bytes: Vec<u8>,
        compress: bool,
    ) -> Result<WriteOutcome, ExportError>;
}
