//! Configuration management for Lectern.
//!
//! # Overview
//!
//! Lectern uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `LECTERN_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ExportConfig`] - Batch options and manifest location
//! - [`SessionsConfig`] - Session store location
//! - [`ConverterConfig`] - External PDF renderer
//! - [`LoggingConfig`] - Logging configuration
//! - `[[jobs]]` - One table per export job
//!
//! # Example Configuration
//!
//! ```toml
//! [export]
//! max_concurrent_jobs = 4
//! continue_on_error = true
//!
//! [sessions]
//! root = "${COURSE_HOME}/sessions"
//!
//! [[jobs]]
//! job_id = "intro"
//! session_ids = ["s1"]
//! formats = ["html", "pdf"]
//! output_directory = "exports"
//! naming_strategy = "content_based"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ConverterConfig, ExportConfig, LecternConfig, LoggingConfig,
    SessionsConfig,
};
