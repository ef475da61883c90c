//! Configuration schema types
//!
//! This module defines the configuration structure for Lectern.

use crate::domain::{BatchExportJob, BatchExportOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main Lectern configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecternConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Batch options
    #[serde(default)]
    pub export: ExportConfig,

    /// Session store settings
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Format converter settings
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Export jobs
    #[serde(default)]
    pub jobs: Vec<BatchExportJob>,
}

impl LecternConfig {
    /// Validates the configuration
    ///
    /// Only file-level rules are checked here. Job-level rules (writable
    /// directories, placeholders, duplicate formats) are enforced by the
    /// batch manager right before execution.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.sessions.validate()?;
        self.converter.validate()?;
        self.logging.validate()?;

        if self.jobs.is_empty() {
            return Err("at least one [[jobs]] entry is required".to_string());
        }

        let mut seen = HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.job_id.as_str()) {
                return Err(format!("duplicate job_id '{}'", job.job_id));
            }
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Batch export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Run jobs concurrently
    #[serde(default = "default_true")]
    pub parallel_exports: bool,

    /// Maximum number of jobs running at once (1-64)
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Keep going after a job fails
    #[serde(default = "default_true")]
    pub continue_on_error: bool,

    /// Build a manifest after the batch
    #[serde(default = "default_true")]
    pub create_manifest: bool,

    /// Gzip every output file
    #[serde(default)]
    pub compress_output: bool,

    /// Where the CLI writes the manifest
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
}

impl ExportConfig {
    /// Batch options described by this section
    pub fn to_options(&self) -> BatchExportOptions {
        BatchExportOptions {
            parallel_exports: self.parallel_exports,
            max_concurrent_jobs: self.max_concurrent_jobs,
            continue_on_error: self.continue_on_error,
            create_manifest: self.create_manifest,
            compress_output: self.compress_output,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_jobs == 0 || self.max_concurrent_jobs > 64 {
            return Err(format!(
                "export.max_concurrent_jobs must be between 1 and 64, got {}",
                self.max_concurrent_jobs
            ));
        }

        if self.create_manifest && self.manifest_path.trim().is_empty() {
            return Err("export.manifest_path cannot be empty when create_manifest is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            parallel_exports: true,
            max_concurrent_jobs: default_max_concurrent_jobs(),
            continue_on_error: true,
            create_manifest: true,
            compress_output: false,
            manifest_path: default_manifest_path(),
        }
    }
}

/// File session store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory holding `{session_id}.json` / `{session_id}.md` files
    #[serde(default = "default_sessions_root")]
    pub root: String,
}

impl SessionsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("sessions.root cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            root: default_sessions_root(),
        }
    }
}

/// Converter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// External command used for PDF output (reads Markdown on stdin)
    #[serde(default)]
    pub pdf_command: Option<String>,

    /// Arguments for the PDF command
    #[serde(default)]
    pub pdf_args: Vec<String>,

    /// Timeout for one external render in seconds
    #[serde(default = "default_converter_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ConverterConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(cmd) = &self.pdf_command {
            if cmd.trim().is_empty() {
                return Err("converter.pdf_command cannot be empty when set".to_string());
            }
        }
        if self.timeout_seconds == 0 {
            return Err("converter.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            pdf_command: None,
            pdf_args: Vec::new(),
            timeout_seconds: default_converter_timeout_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_manifest_path() -> String {
    "lectern-manifest.json".to_string()
}

fn default_sessions_root() -> String {
    "sessions".to_string()
}

fn default_converter_timeout_seconds() -> u64 {
    120
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
