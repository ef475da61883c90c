//! Batch manifest
//!
//! A manifest records every job and every export of a batch, including
//! failures. Building one is pure: the same result always yields the same
//! manifest.

use crate::core::export::executor::{ExportResult, JobResult};
use crate::core::export::manager::BatchExportResult;
use crate::domain::{ErrorKind, ExportFormat, JobId, LecternError, Result, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manifest format version
pub const MANIFEST_VERSION: &str = "1.0";

/// Serializable record of a finished batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub totals: ManifestTotals,
    pub jobs: Vec<ManifestJob>,
}

/// Batch-level counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestTotals {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
    pub total_files: usize,
    pub total_bytes: u64,
    pub elapsed_ms: u64,
    pub started_at: DateTime<Utc>,
    pub interrupted: bool,
}

/// One job in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestJob {
    pub job_id: JobId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub exports: Vec<ManifestExport>,
}

/// One export in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub format: ExportFormat,
    pub session_ids: Vec<SessionId>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&ExportResult> for ManifestExport {
    fn from(result: &ExportResult) -> Self {
        Self {
            path: result.output_path.clone(),
            size: result.file_size,
            checksum: result.checksum.clone(),
            format: result.format,
            session_ids: result.session_ids.clone(),
            success: result.success,
            error_kind: result.error_kind,
            error_message: result.error_message.clone(),
        }
    }
}

impl From<&JobResult> for ManifestJob {
    fn from(result: &JobResult) -> Self {
        Self {
            job_id: result.job_id.clone(),
            success: result.success,
            error_kind: result.error_kind,
            error_message: result.error_message.clone(),
            duration_ms: result.duration_ms,
            exports: result.export_results.iter().map(ManifestExport::from).collect(),
        }
    }
}

impl Manifest {
    /// Successful exports across all jobs
    pub fn successful_exports(&self) -> impl Iterator<Item = (&JobId, &ManifestExport)> {
        self.jobs
            .iter()
            .flat_map(|job| job.exports.iter().map(move |e| (&job.job_id, e)))
            .filter(|(_, e)| e.success)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed input
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the manifest to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LecternError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, self.to_json()?)
            .map_err(|e| LecternError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), jobs = self.jobs.len(), "Manifest saved");
        Ok(())
    }

    /// Read a manifest from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LecternError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// Builds manifests from batch results
pub struct ManifestBuilder;

impl ManifestBuilder {
    /// Aggregate a batch result into a manifest
    ///
    /// Any manifest already attached to `result` is ignored.
    pub fn build(result: &BatchExportResult) -> Manifest {
        Manifest {
            version: MANIFEST_VERSION.to_string(),
            created_at: result.completed_at,
            totals: ManifestTotals {
                total_jobs: result.total_jobs,
                successful_jobs: result.successful_jobs,
                failed_jobs: result.failed_jobs,
                total_files: result.total_files_created,
                total_bytes: result.total_bytes_written,
                elapsed_ms: result.total_elapsed_time.as_millis() as u64,
                started_at: result.started_at,
                interrupted: result.interrupted,
            },
            jobs: result.job_results.iter().map(ManifestJob::from).collect(),
        }
    }
}
