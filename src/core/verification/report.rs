//! Verification report structures

use crate::domain::{ExportFormat, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of checking a manifest against the files on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Total number of exports examined
    pub total_verified: usize,

    /// Exports whose file matched size and checksum
    pub passed: usize,

    /// Exports whose file was missing or differed
    pub failed: usize,

    /// Exports recorded as failed in the manifest
    pub skipped: usize,

    /// Details of each failure
    pub failures: Vec<VerificationFailure>,

    /// Duration of verification in milliseconds
    pub duration_ms: u64,
}

/// One export that did not verify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub job_id: JobId,
    pub format: ExportFormat,
    pub path: Option<PathBuf>,
    /// Checksum recorded in the manifest
    pub expected_checksum: Option<String>,
    /// Checksum of the file on disk, when it could be read
    pub actual_checksum: Option<String>,
    pub reason: String,
}

impl VerificationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_verified: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record a successful verification
    pub fn record_pass(&mut self) {
        self.total_verified += 1;
        self.passed += 1;
    }

    /// Record a failed verification
    pub fn record_failure(&mut self, failure: VerificationFailure) {
        self.total_verified += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Record an export that was not checked
    pub fn record_skip(&mut self) {
        self.total_verified += 1;
        self.skipped += 1;
    }

    /// Set the duration of verification
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Check if nothing failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Passed exports as a percentage of checked ones
    ///
    /// Skipped exports are left out of the ratio.
    pub fn success_rate(&self) -> f64 {
        let checked = self.passed + self.failed;
        if checked == 0 {
            return 100.0;
        }
        (self.passed as f64 / checked as f64) * 100.0
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Exports examined: {}\n", self.total_verified));
        summary.push_str(&format!("  ✅ Passed: {}\n", self.passed));
        summary.push_str(&format!("  ❌ Failed: {}\n", self.failed));
        summary.push_str(&format!("  ⏭️  Skipped: {}\n", self.skipped));
        summary.push_str(&format!("  Success rate: {:.2}%\n", self.success_rate()));

        if !self.failures.is_empty() {
            summary.push_str("\n❌ Failures:\n");
            for (i, failure) in self.failures.iter().enumerate() {
                let path = failure
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<no path>".to_string());
                summary.push_str(&format!("  {}. {} ({})\n", i + 1, path, failure.format));
                summary.push_str(&format!("     Job: {}\n", failure.job_id));
                summary.push_str(&format!("     Reason: {}\n", failure.reason));
            }
        }

        summary
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> VerificationFailure {
        VerificationFailure {
            job_id: JobId::new("week-01").unwrap(),
            format: ExportFormat::Html,
            path: Some(PathBuf::from("out/s1.html")),
            expected_checksum: Some("aa".to_string()),
            actual_checksum: Some("bb".to_string()),
            reason: "checksum mismatch".to_string(),
        }
    }

    #[test]
    fn test_new_report_is_successful() {
        let report = VerificationReport::new();
        assert_eq!(report.total_verified, 0);
        assert!(report.is_success());
        assert_eq!(report.success_rate(), 100.0);
    }

    #[test]
    fn test_counters() {
        let mut report = VerificationReport::new();
        report.record_pass();
        report.record_pass();
        report.record_pass();
        report.record_skip();
        report.record_failure(failure());

        assert_eq!(report.total_verified, 5);
        assert_eq!(report.passed, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert!(!report.is_success());
        assert_eq!(report.success_rate(), 75.0);
    }

    #[test]
    fn test_format_summary_lists_failures() {
        let mut report = VerificationReport::new();
        report.record_failure(failure());
        report.set_duration(15);

        let summary = report.format_summary();
        assert!(summary.contains("Duration: 15 ms"));
        assert!(summary.contains("out/s1.html (html)"));
        assert!(summary.contains("Job: week-01"));
        assert!(summary.contains("checksum mismatch"));
    }
}
