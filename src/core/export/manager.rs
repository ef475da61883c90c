//! Batch export orchestration
//!
//! [`BatchExportManager`] validates a set of jobs, runs them on a bounded
//! worker pool and aggregates the outcome into a [`BatchExportResult`].
//!
//! # Failure policy
//!
//! With `continue_on_error = false` the first failed job raises a halt flag
//! before it gives its permit back. Every job that obtains a permit after
//! that point is recorded as `Skipped` without running. Jobs already
//! running are left to finish. A shutdown signal halts dispatch the same
//! way and marks the result as interrupted.

use crate::adapters::factory::Adapters;
use crate::adapters::traits::{FormatConverter, OutputWriter, SessionStore};
use crate::core::export::executor::{BatchContext, JobExecutor, JobResult};
use crate::core::export::manifest::{Manifest, ManifestBuilder};
use crate::core::export::naming::{validate_pattern, PathRegistry};
use crate::core::export::progress::{BatchProgress, ProgressReceiver, ProgressReporter};
use crate::domain::{
    BatchExportJob, BatchExportOptions, JobId, LecternError, NamingStrategy, Result,
};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Semaphore};

/// Outcome of a whole batch
#[derive(Debug, Clone)]
pub struct BatchExportResult {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
    /// In completion order
    pub job_results: Vec<JobResult>,
    pub total_elapsed_time: Duration,
    pub total_files_created: usize,
    pub total_bytes_written: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// A shutdown signal stopped dispatch early
    pub interrupted: bool,
    pub manifest: Option<Manifest>,
}

impl BatchExportResult {
    /// Check if every job succeeded
    pub fn is_successful(&self) -> bool {
        self.failed_jobs == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_jobs == 0 {
            return 100.0;
        }
        (self.successful_jobs as f64 / self.total_jobs as f64) * 100.0
    }

    /// Result for a specific job
    pub fn job(&self, job_id: &str) -> Option<&JobResult> {
        self.job_results.iter().find(|r| r.job_id.as_str() == job_id)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_jobs = self.total_jobs,
            successful = self.successful_jobs,
            failed = self.failed_jobs,
            files = self.total_files_created,
            bytes = self.total_bytes_written,
            duration_ms = self.total_elapsed_time.as_millis() as u64,
            interrupted = self.interrupted,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch export completed"
        );

        for job in self.job_results.iter().filter(|j| !j.success) {
            tracing::warn!(
                job_id = %job.job_id,
                error_kind = ?job.error_kind,
                message = job.error_message.as_deref().unwrap_or(""),
                "Job failed"
            );
        }
    }
}

/// Runs batches of export jobs
pub struct BatchExportManager {
    store: Arc<dyn SessionStore>,
    converter: Arc<dyn FormatConverter>,
    writer: Arc<dyn OutputWriter>,
    progress_tx: Mutex<Option<mpsc::UnboundedSender<BatchProgress>>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl BatchExportManager {
    /// Create a manager over the given collaborators
    pub fn new(
        store: Arc<dyn SessionStore>,
        converter: Arc<dyn FormatConverter>,
        writer: Arc<dyn OutputWriter>,
    ) -> Self {
        Self {
            store,
            converter,
            writer,
            progress_tx: Mutex::new(None),
            shutdown: None,
        }
    }

    /// Create a manager from configured adapters
    pub fn from_adapters(adapters: Adapters) -> Self {
        Self::new(adapters.store, adapters.converter, adapters.writer)
    }

    /// Stop dispatching new jobs once the signal turns `true`
    pub fn with_shutdown_signal(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Receive progress updates for the next `execute` call
    ///
    /// A later subscription replaces an earlier one.
    pub fn subscribe_progress(&self) -> ProgressReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        *self
            .progress_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(tx);
        rx
    }

    fn take_progress_sender(&self) -> Option<mpsc::UnboundedSender<BatchProgress>> {
        self.progress_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Check every job without running anything
    ///
    /// Output directories are created when missing and probed for write
    /// access.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Validation` naming the first offending job
    pub async fn validate(&self, jobs: &[BatchExportJob], options: &BatchExportOptions) -> Result<()> {
        if options.max_concurrent_jobs == 0 {
            return Err(LecternError::validation(
                "<batch>",
                "max_concurrent_jobs must be at least 1",
            ));
        }

        let mut job_ids = HashSet::new();
        let mut probed_dirs = HashSet::new();

        for job in jobs {
            let id = job.job_id.as_str();

            if !job_ids.insert(id) {
                return Err(LecternError::validation(id, "duplicate job_id in batch"));
            }
            if job.session_ids.is_empty() {
                return Err(LecternError::validation(id, "session_ids must not be empty"));
            }
            if job.formats.is_empty() {
                return Err(LecternError::validation(id, "formats must not be empty"));
            }

            let mut seen = HashSet::new();
            if let Some(dup) = job.formats.iter().find(|f| !seen.insert(**f)) {
                return Err(LecternError::validation(
                    id,
                    format!("format '{dup}' is listed more than once"),
                ));
            }

            if let NamingStrategy::Custom(pattern) = &job.naming_strategy {
                validate_pattern(pattern).map_err(|e| LecternError::validation(id, e.to_string()))?;
            }

            if probed_dirs.insert(job.output_directory.clone()) {
                probe_output_directory(&job.output_directory)
                    .await
                    .map_err(|reason| LecternError::validation(id, reason))?;
            }
        }

        Ok(())
    }

    /// Run a batch to completion
    ///
    /// Resolves once every job has settled. Per-job failures are reported
    /// in the result, not as errors.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Validation` if any job is invalid; in that
    /// case nothing is executed.
    pub async fn execute(
        &self,
        jobs: Vec<BatchExportJob>,
        options: &BatchExportOptions,
    ) -> Result<BatchExportResult> {
        // Dropped on any early return so subscribers see the channel close
        let progress_tx = self.take_progress_sender();
        self.validate(&jobs, options).await?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let total_jobs = jobs.len();
        let concurrency = options.effective_concurrency();
        let job_ids: Vec<JobId> = jobs.iter().map(|j| j.job_id.clone()).collect();

        tracing::info!(
            jobs = total_jobs,
            concurrency,
            continue_on_error = options.continue_on_error,
            compress = options.compress_output,
            "Starting batch export"
        );

        let mut reporter = ProgressReporter::with_sender(progress_tx, total_jobs);
        reporter.start();

        let context = Arc::new(BatchContext {
            store: Arc::clone(&self.store),
            converter: Arc::clone(&self.converter),
            writer: Arc::clone(&self.writer),
            registry: Arc::new(PathRegistry::new()),
            timestamp: started_at,
            compress_output: options.compress_output,
        });

        let halted = Arc::new(AtomicBool::new(false));
        let interrupted = Arc::new(AtomicBool::new(false));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<JobResult>();

        let dispatcher = Dispatcher {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            context,
            halted: Arc::clone(&halted),
            interrupted: Arc::clone(&interrupted),
            shutdown: self.shutdown.clone(),
            continue_on_error: options.continue_on_error,
            results: result_tx,
        };
        let dispatch_handle = tokio::spawn(dispatcher.run(jobs));

        let mut job_results = Vec::with_capacity(total_jobs);
        while let Some(result) = result_rx.recv().await {
            reporter.job_settled(&result);
            job_results.push(result);
        }

        if let Err(e) = dispatch_handle.await {
            tracing::error!(error = %e, "Dispatcher task failed");
        }

        // Jobs lost to an aborted task still need exactly one result
        let reported: HashSet<JobId> = job_results.iter().map(|r| r.job_id.clone()).collect();
        for job_id in job_ids.into_iter().filter(|id| !reported.contains(id)) {
            let result = JobResult::internal(job_id, "job produced no result");
            reporter.job_settled(&result);
            job_results.push(result);
        }
        reporter.finish();

        let successful_jobs = job_results.iter().filter(|r| r.success).count();
        let mut result = BatchExportResult {
            total_jobs,
            successful_jobs,
            failed_jobs: total_jobs - successful_jobs,
            total_files_created: job_results.iter().map(JobResult::files_created).sum(),
            total_bytes_written: job_results.iter().map(JobResult::bytes_written).sum(),
            job_results,
            total_elapsed_time: clock.elapsed(),
            started_at,
            completed_at: Utc::now(),
            interrupted: interrupted.load(Ordering::SeqCst),
            manifest: None,
        };

        if options.create_manifest {
            result.manifest = Some(ManifestBuilder::build(&result));
        }

        result.log_summary();
        Ok(result)
    }
}

/// Hands jobs to the worker pool in submission order
struct Dispatcher {
    semaphore: Arc<Semaphore>,
    context: Arc<BatchContext>,
    halted: Arc<AtomicBool>,
    interrupted: Arc<AtomicBool>,
    shutdown: Option<watch::Receiver<bool>>,
    continue_on_error: bool,
    results: mpsc::UnboundedSender<JobResult>,
}

impl Dispatcher {
    async fn run(self, jobs: Vec<BatchExportJob>) {
        for job in jobs {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = self.results.send(JobResult::skipped(job.job_id));
                    continue;
                }
            };

            if self.shutdown_requested() {
                self.interrupted.store(true, Ordering::SeqCst);
                self.halted.store(true, Ordering::SeqCst);
            }

            if self.halted.load(Ordering::SeqCst) {
                tracing::debug!(job_id = %job.job_id, "Skipping job, batch halted");
                let _ = self.results.send(JobResult::skipped(job.job_id));
                drop(permit);
                continue;
            }

            let executor = JobExecutor::new(Arc::clone(&self.context));
            let halted = Arc::clone(&self.halted);
            let results = self.results.clone();
            let continue_on_error = self.continue_on_error;

            tokio::spawn(async move {
                let result = match AssertUnwindSafe(executor.run(&job)).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        tracing::error!(job_id = %job.job_id, panic = %message, "Export job panicked");
                        JobResult::internal(job.job_id.clone(), message)
                    }
                };

                if !result.success && !continue_on_error {
                    halted.store(true, Ordering::SeqCst);
                }
                let _ = results.send(result);
                drop(permit);
            });
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "job panicked".to_string()
    }
}

async fn probe_output_directory(dir: &Path) -> std::result::Result<(), String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("output_directory {} cannot be created: {e}", dir.display()))?;

    let probe = dir.join(format!(".lectern-probe-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&probe, b"")
        .await
        .map_err(|e| format!("output_directory {} is not writable: {e}", dir.display()))?;
    if let Err(e) = tokio::fs::remove_file(&probe).await {
        tracing::warn!(path = %probe.display(), error = %e, "Failed to remove write probe");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BuiltinConverter, InMemorySessionStore, LocalFileWriter};
    use crate::domain::{ErrorKind, ExportFormat};
    use tempfile::TempDir;

    fn manager() -> BatchExportManager {
        let store = InMemorySessionStore::new()
            .with_session("s1", "One", "alpha")
            .with_session("s2", "Two", "beta");
        BatchExportManager::new(
            Arc::new(store),
            Arc::new(BuiltinConverter::new()),
            Arc::new(LocalFileWriter::new()),
        )
    }

    fn job(id: &str, session: &str, dir: &Path) -> BatchExportJob {
        BatchExportJob::builder(id)
            .session(session)
            .format(ExportFormat::Markdown)
            .output_directory(dir)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_validation_rejects_duplicate_formats() {
        let dir = TempDir::new().unwrap();
        let mut bad = job("dup", "s1", dir.path());
        bad.formats.push(ExportFormat::Markdown);

        let err = manager()
            .execute(vec![bad], &BatchExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::Validation { ref job_id, .. } if job_id == "dup"));
    }

    #[tokio::test]
    async fn test_validation_rejects_unknown_placeholder_before_running() {
        let dir = TempDir::new().unwrap();
        let good = job("good", "s1", dir.path());
        let mut bad = job("bad", "s2", dir.path());
        bad.naming_strategy = NamingStrategy::Custom("{job_id}_{author}".into());

        let err = manager()
            .execute(vec![good, bad], &BatchExportOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("author"));
        assert!(!dir.path().join("s1.md").exists());
    }

    #[tokio::test]
    async fn test_validation_rejects_duplicate_job_ids_and_zero_concurrency() {
        let dir = TempDir::new().unwrap();
        let jobs = vec![job("a", "s1", dir.path()), job("a", "s2", dir.path())];
        assert!(manager()
            .validate(&jobs, &BatchExportOptions::default())
            .await
            .is_err());

        let options = BatchExportOptions {
            max_concurrent_jobs: 0,
            ..Default::default()
        };
        assert!(manager().validate(&jobs[..1], &options).await.is_err());
    }

    #[tokio::test]
    async fn test_validation_creates_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        manager()
            .validate(&[job("a", "s1", &nested)], &BatchExportOptions::default())
            .await
            .unwrap();
        assert!(nested.is_dir());
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_execute_aggregates_results() {
        let dir = TempDir::new().unwrap();
        let jobs = vec![job("a", "s1", dir.path()), job("b", "missing", dir.path())];

        let result = manager()
            .execute(jobs, &BatchExportOptions::default())
            .await
            .unwrap();

        assert_eq!(result.total_jobs, 2);
        assert_eq!(result.successful_jobs, 1);
        assert_eq!(result.failed_jobs, 1);
        assert_eq!(result.total_files_created, 1);
        assert!(result.total_bytes_written > 0);
        assert!(!result.interrupted);
        assert_eq!(
            result.job("b").unwrap().error_kind,
            Some(ErrorKind::SessionNotFound)
        );
        assert_eq!(result.manifest.as_ref().unwrap().jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_signal_skips_everything() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = watch::channel(true);
        let manager = manager().with_shutdown_signal(rx);

        let result = manager
            .execute(
                vec![job("a", "s1", dir.path()), job("b", "s2", dir.path())],
                &BatchExportOptions::default(),
            )
            .await
            .unwrap();
        drop(tx);

        assert!(result.interrupted);
        assert_eq!(result.failed_jobs, 2);
        assert!(result
            .job_results
            .iter()
            .all(|r| r.error_kind == Some(ErrorKind::Skipped)));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "job panicked");
    }
}
