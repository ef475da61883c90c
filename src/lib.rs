// Lectern - Batch Export Orchestrator for Course Content
// Licensed under the MIT License

//! # Lectern - Batch Export Orchestrator
//!
//! Lectern turns recorded course sessions into publishable files. A batch
//! of export jobs is validated up front, run on a bounded worker pool and
//! summarized in a result with an optional manifest of every output.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Batch orchestration, job execution, naming, progress, manifests, verification
//! - [`adapters`] - Session stores, format converters and output writers
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lectern::adapters::create_adapters;
//! use lectern::config::load_config;
//! use lectern::core::export::BatchExportManager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("lectern.toml")?;
//!     let manager = BatchExportManager::from_adapters(create_adapters(&config)?);
//!
//!     let result = manager
//!         .execute(config.jobs.clone(), &config.export.to_options())
//!         .await?;
//!
//!     println!("{} of {} jobs succeeded", result.successful_jobs, result.total_jobs);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Whole-call failures (bad configuration, invalid jobs) are returned as
//! [`domain::LecternError`]. Failures of individual exports never abort a
//! batch; they are recorded in the result with an [`domain::ErrorKind`].
//!
//! ```rust
//! use lectern::domain::LecternError;
//!
//! let err = LecternError::validation("week-01", "formats must not be empty");
//! assert!(err.to_string().starts_with("ValidationError"));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
