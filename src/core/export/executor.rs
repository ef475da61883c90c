//! Single-job execution
//!
//! A [`JobExecutor`] fetches the sessions of one job, converts them into
//! every requested format and writes the files. Failures are recorded on
//! the individual [`ExportResult`] and never abort the job early.

use crate::adapters::traits::{FormatConverter, OutputWriter, SessionStore, WriteOutcome};
use crate::core::export::naming::{NamingContext, PathRegistry};
use crate::domain::{
    BatchExportJob, ConversionOptions, Document, ErrorKind, ExportError, ExportFormat, JobId,
    SessionId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub success: bool,
    pub format: ExportFormat,
    /// Sessions that fed this output
    pub session_ids: Vec<SessionId>,
    pub output_path: Option<PathBuf>,
    /// Bytes on disk
    pub file_size: u64,
    /// SHA-256 of the bytes on disk
    pub checksum: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
}

impl ExportResult {
    /// A successful write
    pub fn succeeded(
        format: ExportFormat,
        session_ids: Vec<SessionId>,
        path: PathBuf,
        outcome: WriteOutcome,
    ) -> Self {
        Self {
            success: true,
            format,
            session_ids,
            output_path: Some(path),
            file_size: outcome.size,
            checksum: Some(outcome.checksum),
            error_kind: None,
            error_message: None,
        }
    }

    /// A failed conversion
    pub fn failed(format: ExportFormat, session_ids: Vec<SessionId>, error: &ExportError) -> Self {
        Self {
            success: false,
            format,
            session_ids,
            output_path: None,
            file_size: 0,
            checksum: None,
            error_kind: Some(error.kind()),
            error_message: Some(error.to_string()),
        }
    }
}

/// Outcome of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: JobId,
    pub success: bool,
    pub export_results: Vec<ExportResult>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    /// `None` for jobs that never started
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
}

impl JobResult {
    /// Summarize the exports of a job that ran
    ///
    /// The job succeeds iff every export succeeded. Otherwise the message
    /// reads `"<failed> of <total> exports failed: <first error>"`.
    pub fn from_exports(
        job_id: JobId,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        export_results: Vec<ExportResult>,
    ) -> Self {
        let failed: Vec<&ExportResult> = export_results.iter().filter(|r| !r.success).collect();
        let (error_kind, error_message) = match failed.first() {
            None => (None, None),
            Some(first) => (
                first.error_kind,
                Some(format!(
                    "{} of {} exports failed: {}",
                    failed.len(),
                    export_results.len(),
                    first.error_message.as_deref().unwrap_or("unknown error")
                )),
            ),
        };

        Self {
            job_id,
            success: error_kind.is_none(),
            export_results,
            error_kind,
            error_message,
            started_at: Some(started_at),
            duration_ms,
        }
    }

    /// A job that failed as a whole before any export was attempted
    pub fn failed(job_id: JobId, started_at: DateTime<Utc>, duration_ms: u64, error: &ExportError) -> Self {
        Self {
            job_id,
            success: false,
            export_results: Vec::new(),
            error_kind: Some(error.kind()),
            error_message: Some(error.to_string()),
            started_at: Some(started_at),
            duration_ms,
        }
    }

    /// A job that never started because the batch halted
    pub fn skipped(job_id: JobId) -> Self {
        Self {
            job_id,
            success: false,
            export_results: Vec::new(),
            error_kind: Some(ErrorKind::Skipped),
            error_message: Some("Skipped: batch halted before this job started".to_string()),
            started_at: None,
            duration_ms: 0,
        }
    }

    /// A job that crashed
    pub fn internal(job_id: JobId, message: impl Into<String>) -> Self {
        Self {
            job_id,
            success: false,
            export_results: Vec::new(),
            error_kind: Some(ErrorKind::Internal),
            error_message: Some(format!("InternalError: {}", message.into())),
            started_at: None,
            duration_ms: 0,
        }
    }

    /// Successful exports in this job
    pub fn files_created(&self) -> usize {
        self.export_results.iter().filter(|r| r.success).count()
    }

    /// Bytes written by this job
    pub fn bytes_written(&self) -> u64 {
        self.export_results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.file_size)
            .sum()
    }
}

/// State shared by every job in a batch
#[derive(Clone)]
pub struct BatchContext {
    pub store: Arc<dyn SessionStore>,
    pub converter: Arc<dyn FormatConverter>,
    pub writer: Arc<dyn OutputWriter>,
    pub registry: Arc<PathRegistry>,
    /// Captured once when the batch starts
    pub timestamp: DateTime<Utc>,
    pub compress_output: bool,
}

/// Runs one job against a batch context
pub struct JobExecutor {
    context: Arc<BatchContext>,
}

impl JobExecutor {
    /// Create an executor
    pub fn new(context: Arc<BatchContext>) -> Self {
        Self { context }
    }

    /// Run a job to completion
    ///
    /// Never fails; every problem is reported inside the returned result.
    pub async fn run(&self, job: &BatchExportJob) -> JobResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        crate::log_job_start!(&job.job_id, job.session_ids.len(), job.formats.len());

        let options = job.conversion_options();
        let result = if job.merge_sessions {
            match self.fetch_merged(job).await {
                Ok(document) => {
                    let exports = self.export_document(job, &document, &options).await;
                    JobResult::from_exports(job.job_id.clone(), started_at, elapsed_ms(&clock), exports)
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.job_id, error = %e, "Merged job aborted");
                    JobResult::failed(job.job_id.clone(), started_at, elapsed_ms(&clock), &e)
                }
            }
        } else {
            let mut exports = Vec::with_capacity(job.session_ids.len() * job.formats.len());
            for session_id in &job.session_ids {
                match self.context.store.get_session_content(session_id).await {
                    Ok(document) => {
                        exports.extend(self.export_document(job, &document, &options).await);
                    }
                    Err(e) => {
                        tracing::warn!(
                            job_id = %job.job_id,
                            session_id = %session_id,
                            error = %e,
                            "Session lookup failed"
                        );
                        exports.extend(
                            job.formats
                                .iter()
                                .map(|f| ExportResult::failed(*f, vec![session_id.clone()], &e)),
                        );
                    }
                }
            }
            JobResult::from_exports(job.job_id.clone(), started_at, elapsed_ms(&clock), exports)
        };

        crate::log_job_complete!(
            &result.job_id,
            result.success,
            result.files_created(),
            clock.elapsed()
        );
        result
    }

    async fn fetch_merged(&self, job: &BatchExportJob) -> Result<Document, ExportError> {
        let mut documents = Vec::with_capacity(job.session_ids.len());
        for session_id in &job.session_ids {
            documents.push(self.context.store.get_session_content(session_id).await?);
        }
        Document::merge(documents)
            .ok_or_else(|| ExportError::SessionNotFound(job.job_id.to_string()))
    }

    async fn export_document(
        &self,
        job: &BatchExportJob,
        document: &Document,
        options: &ConversionOptions,
    ) -> Vec<ExportResult> {
        let session_ids = document.session_ids();
        let mut results = Vec::with_capacity(job.formats.len());

        for format in &job.formats {
            let result = match self.export_format(job, document, &session_ids, *format, options).await {
                Ok((path, outcome)) => {
                    tracing::debug!(
                        job_id = %job.job_id,
                        format = %format,
                        path = %path.display(),
                        size = outcome.size,
                        "Export written"
                    );
                    ExportResult::succeeded(*format, session_ids.clone(), path, outcome)
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.job_id, format = %format, error = %e, "Export failed");
                    ExportResult::failed(*format, session_ids.clone(), &e)
                }
            };
            results.push(result);
        }
        results
    }

    async fn export_format(
        &self,
        job: &BatchExportJob,
        document: &Document,
        session_ids: &[SessionId],
        format: ExportFormat,
        options: &ConversionOptions,
    ) -> Result<(PathBuf, WriteOutcome), ExportError> {
        let ctx = NamingContext {
            job_id: &job.job_id,
            session_ids,
            timestamp: self.context.timestamp,
            format,
            title: &document.title,
            compressed: self.context.compress_output,
        };
        let path = self
            .context
            .registry
            .claim(&job.naming_strategy, &ctx, &job.output_directory)?;

        let bytes = self.context.converter.convert(document, format, options).await?;
        let outcome = self
            .context
            .writer
            .write(&job.output_directory, &path, bytes, self.context.compress_output)
            .await?;
        Ok((path, outcome))
    }
}

fn elapsed_ms(clock: &Instant) -> u64 {
    clock.elapsed().as_millis() as u64
}
