//! Manifest verification
//!
//! Every successful export listed in a manifest is re-read from disk and
//! compared against the recorded size and checksum.

use crate::core::export::manifest::{Manifest, ManifestExport};
use crate::core::verification::checksum::calculate_checksum_file;
use crate::core::verification::report::{VerificationFailure, VerificationReport};
use crate::domain::JobId;
use std::path::PathBuf;
use std::time::Instant;

/// Checks manifests against the filesystem
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    base_dir: Option<PathBuf>,
}

impl Verifier {
    /// Create a verifier that resolves relative paths against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative manifest paths against `base_dir`
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Verify every export in a manifest
    ///
    /// Exports recorded as failed are skipped. Reading happens on the
    /// blocking thread pool.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lectern::core::export::Manifest;
    /// use lectern::core::verification::Verifier;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let manifest = Manifest::load("lectern-manifest.json")?;
    /// let report = Verifier::new().verify_manifest(&manifest).await;
    /// println!("{}", report.format_summary());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verify_manifest(&self, manifest: &Manifest) -> VerificationReport {
        let start = Instant::now();
        let mut report = VerificationReport::new();

        tracing::info!(
            jobs = manifest.jobs.len(),
            created_at = %manifest.created_at,
            "Starting manifest verification"
        );

        for job in &manifest.jobs {
            for export in &job.exports {
                if !export.success {
                    report.record_skip();
                    continue;
                }

                match self.verify_export(export).await {
                    Ok(()) => report.record_pass(),
                    Err((reason, actual_checksum)) => {
                        tracing::warn!(
                            job_id = %job.job_id,
                            path = ?export.path,
                            reason = %reason,
                            "Export failed verification"
                        );
                        report.record_failure(failure(&job.job_id, export, reason, actual_checksum));
                    }
                }
            }
        }

        report.set_duration(start.elapsed().as_millis() as u64);

        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            duration_ms = report.duration_ms,
            "Verification completed"
        );

        report
    }

    async fn verify_export(&self, export: &ManifestExport) -> Result<(), (String, Option<String>)> {
        let Some(path) = &export.path else {
            return Err(("manifest entry has no path".to_string(), None));
        };
        let Some(expected) = &export.checksum else {
            return Err(("manifest entry has no checksum".to_string(), None));
        };

        let full_path = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.clone(),
        };

        let (actual, size) = tokio::task::spawn_blocking(move || calculate_checksum_file(&full_path))
            .await
            .map_err(|e| (format!("verification task failed: {e}"), None))?
            .map_err(|e| (format!("cannot read file: {e}"), None))?;

        if size != export.size {
            return Err((
                format!("size mismatch: expected {} bytes, found {}", export.size, size),
                Some(actual),
            ));
        }
        if &actual != expected {
            return Err(("checksum mismatch".to_string(), Some(actual)));
        }
        Ok(())
    }
}

fn failure(
    job_id: &JobId,
    export: &ManifestExport,
    reason: String,
    actual_checksum: Option<String>,
) -> VerificationFailure {
    VerificationFailure {
        job_id: job_id.clone(),
        format: export.format,
        path: export.path.clone(),
        expected_checksum: export.checksum.clone(),
        actual_checksum,
        reason,
    }
}
