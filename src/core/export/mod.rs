//! Batch export engine
//!
//! This module provides the export pipeline:
//! - [`manager`] - Validation, bounded worker pool and aggregation
//! - [`executor`] - Running a single job
//! - [`naming`] - Output file naming and collision handling
//! - [`progress`] - Progress snapshots for subscribers
//! - [`manifest`] - Serializable batch manifests

pub mod executor;
pub mod manager;
pub mod manifest;
pub mod naming;
pub mod progress;

pub use executor::{BatchContext, ExportResult, JobExecutor, JobResult};
pub use manager::{BatchExportManager, BatchExportResult};
pub use manifest::{Manifest, ManifestBuilder, ManifestExport, ManifestJob, ManifestTotals};
pub use naming::{sanitize, NamingContext, PathRegistry};
pub use progress::{BatchProgress, ProgressReceiver, ProgressReporter};
