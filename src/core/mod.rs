//! Core business logic for Lectern.
//!
//! # Modules
//!
//! - [`export`] - Batch orchestration, job execution, naming, progress and manifests
//! - [`verification`] - Checksums and manifest verification
//!
//! # Export Workflow
//!
//! 1. **Validate**: Every job is checked up front; nothing runs if one is invalid
//! 2. **Dispatch**: Jobs acquire permits from a bounded pool in submission order
//! 3. **Execute**: Sessions are fetched, converted per format and written
//! 4. **Aggregate**: Job results are folded into a batch result as they settle
//! 5. **Manifest** (optional): The batch result is recorded with checksums
//! 6. **Verify** (later): Files are re-checked against the manifest
//!
//! # Example
//!
//! ```rust,no_run
//! use lectern::adapters::{BuiltinConverter, FileSessionStore, LocalFileWriter};
//! use lectern::core::export::BatchExportManager;
//! use lectern::domain::{BatchExportJob, BatchExportOptions, ExportFormat};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = BatchExportManager::new(
//!     Arc::new(FileSessionStore::new("sessions")),
//!     Arc::new(BuiltinConverter::new()),
//!     Arc::new(LocalFileWriter::new()),
//! );
//!
//! let job = BatchExportJob::builder("week-01")
//!     .sessions(["intro", "ownership"])
//!     .format(ExportFormat::Html)
//!     .output_directory("exports")
//!     .build()?;
//!
//! let mut progress = manager.subscribe_progress();
//! tokio::spawn(async move {
//!     while let Some(update) = progress.recv().await {
//!         println!("{:.1}% {}", update.progress_percent, update.current_operation);
//!     }
//! });
//!
//! let result = manager.execute(vec![job], &BatchExportOptions::default()).await?;
//! println!("Successful: {}", result.successful_jobs);
//! println!("Failed: {}", result.failed_jobs);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod verification;
