//! Domain models and types for Lectern.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`JobId`], [`SessionId`])
//! - **Domain models** ([`Document`], [`BatchExportJob`], [`BatchExportOptions`])
//! - **Error types** ([`LecternError`], [`ExportError`], [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Fallible whole-call operations return [`Result<T, LecternError>`].
//! Per-export failures are carried as [`ExportError`] values inside the
//! batch result instead.
//!
//! ```rust
//! use lectern::domain::{ErrorKind, ExportError};
//!
//! let err = ExportError::SessionNotFound("s9".to_string());
//! assert_eq!(err.kind(), ErrorKind::SessionNotFound);
//! ```

pub mod document;
pub mod errors;
pub mod format;
pub mod ids;
pub mod job;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{Document, Section};
pub use errors::{ErrorKind, ExportError, LecternError, NamingError};
pub use format::ExportFormat;
pub use ids::{JobId, SessionId};
pub use job::{
    BatchExportJob, BatchExportJobBuilder, BatchExportOptions, ConversionOptions, NamingStrategy,
};
pub use result::Result;
