//! Batch progress reporting
//!
//! Progress snapshots are pushed over an unbounded channel. A dropped
//! receiver is not an error; updates are simply discarded.

use crate::core::export::executor::JobResult;
use crate::domain::JobId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;

/// Receiving half handed to progress subscribers
pub type ProgressReceiver = mpsc::UnboundedReceiver<BatchProgress>;

/// Snapshot of a running batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchProgress {
    pub total_jobs: usize,
    pub completed_jobs: usize,
    /// Job whose completion produced this update
    pub current_job_id: Option<JobId>,
    pub current_operation: String,
    /// 0.0 to 100.0, one decimal place
    pub progress_percent: f64,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub errors_encountered: usize,
}

impl BatchProgress {
    /// Percentage of `completed` over `total`, rounded to one decimal
    ///
    /// An empty batch is reported as complete.
    pub fn percent(completed: usize, total: usize) -> f64 {
        if total == 0 {
            return 100.0;
        }
        let raw = completed as f64 * 100.0 / total as f64;
        ((raw * 10.0).round() / 10.0).min(100.0)
    }

    /// Check if this is the final update
    pub fn is_complete(&self) -> bool {
        self.progress_percent >= 100.0 && self.completed_jobs == self.total_jobs
    }
}

/// Emits progress for one batch
#[derive(Debug)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<BatchProgress>>,
    total_jobs: usize,
    completed_jobs: usize,
    errors_encountered: usize,
    started: Instant,
}

impl ProgressReporter {
    /// Create a reporter together with its receiver
    pub fn channel(total_jobs: usize) -> (Self, ProgressReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::with_sender(Some(tx), total_jobs), rx)
    }

    /// Create a reporter around an optional sender
    ///
    /// With `None` every update is only logged.
    pub fn with_sender(sender: Option<mpsc::UnboundedSender<BatchProgress>>, total_jobs: usize) -> Self {
        Self {
            sender,
            total_jobs,
            completed_jobs: 0,
            errors_encountered: 0,
            started: Instant::now(),
        }
    }

    /// Jobs settled so far
    pub fn completed_jobs(&self) -> usize {
        self.completed_jobs
    }

    /// Emit the initial update
    pub fn start(&mut self) {
        self.started = Instant::now();
        let update = self.snapshot(None, "Starting batch".to_string(), 0.0);
        self.emit(update);
    }

    /// Record a settled job (skipped jobs included) and emit an update
    pub fn job_settled(&mut self, result: &JobResult) {
        self.completed_jobs = (self.completed_jobs + 1).min(self.total_jobs);
        if !result.success {
            self.errors_encountered += 1;
        }

        let operation = match (&result.error_kind, result.success) {
            (_, true) => format!("Completed job {}", result.job_id),
            (Some(kind), false) => format!("Job {} failed ({kind})", result.job_id),
            (None, false) => format!("Job {} failed", result.job_id),
        };
        let percent = BatchProgress::percent(self.completed_jobs, self.total_jobs);
        let update = self.snapshot(Some(result.job_id.clone()), operation, percent);

        crate::log_batch_progress!(self.completed_jobs, self.total_jobs);
        self.emit(update);
    }

    /// Emit the final update and close the channel
    pub fn finish(mut self) {
        self.completed_jobs = self.total_jobs;
        let mut update = self.snapshot(None, "Batch complete".to_string(), 100.0);
        update.estimated_completion = Some(Utc::now());
        self.emit(update);
        self.sender.take();
    }

    fn snapshot(&self, job_id: Option<JobId>, operation: String, percent: f64) -> BatchProgress {
        BatchProgress {
            total_jobs: self.total_jobs,
            completed_jobs: self.completed_jobs,
            current_job_id: job_id,
            current_operation: operation,
            progress_percent: percent,
            estimated_completion: self.estimate_completion(),
            errors_encountered: self.errors_encountered,
        }
    }

    fn estimate_completion(&self) -> Option<DateTime<Utc>> {
        if self.completed_jobs == 0 {
            return None;
        }
        let remaining = u32::try_from(self.total_jobs.saturating_sub(self.completed_jobs)).ok()?;
        let completed = u32::try_from(self.completed_jobs).ok()?;
        let average = self.started.elapsed() / completed;
        let eta = chrono::Duration::from_std(average.checked_mul(remaining)?).ok()?;
        Utc::now().checked_add_signed(eta)
    }

    fn emit(&self, update: BatchProgress) {
        if let Some(tx) = &self.sender {
            // Receiver may be gone
            let _ = tx.send(update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn job(id: &str, success: bool) -> JobResult {
        if success {
            JobResult::from_exports(JobId::new(id).unwrap(), Utc::now(), 5, Vec::new())
        } else {
            JobResult::skipped(JobId::new(id).unwrap())
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(BatchProgress::percent(0, 3), 0.0);
        assert_eq!(BatchProgress::percent(1, 3), 33.3);
        assert_eq!(BatchProgress::percent(2, 3), 66.7);
        assert_eq!(BatchProgress::percent(3, 3), 100.0);
        assert_eq!(BatchProgress::percent(0, 0), 100.0);
    }

    #[test]
    fn test_estimate_with_huge_batches_does_not_panic() {
        let (mut reporter, _rx) = ProgressReporter::channel(usize::MAX);
        reporter.completed_jobs = 1;
        assert!(reporter.estimate_completion().is_none());

        let (mut reporter, _rx) = ProgressReporter::channel(u32::MAX as usize);
        if let Some(earlier) = Instant::now().checked_sub(std::time::Duration::from_secs(86_400)) {
            reporter.started = earlier;
        }
        reporter.completed_jobs = 1;
        let _ = reporter.estimate_completion();
    }

    #[test]
    fn test_full_sequence() {
        let (mut reporter, mut rx) = ProgressReporter::channel(2);
        reporter.start();
        reporter.job_settled(&job("a", true));
        reporter.job_settled(&job("b", false));
        reporter.finish();

        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }

        assert_eq!(updates.len(), 4);
        assert_eq!(updates[0].progress_percent, 0.0);
        assert_eq!(updates[0].current_operation, "Starting batch");
        assert_eq!(updates[1].progress_percent, 50.0);
        assert_eq!(updates[1].current_job_id, Some(JobId::new("a").unwrap()));
        assert!(updates[1].estimated_completion.is_some());
        assert_eq!(updates[2].errors_encountered, 1);
        assert!(updates[2].current_operation.contains(&ErrorKind::Skipped.to_string()));

        let last = updates.last().unwrap();
        assert_eq!(last.progress_percent, 100.0);
        assert_eq!(last.current_operation, "Batch complete");
        assert!(last.is_complete());

        // Sender dropped by finish
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (mut reporter, rx) = ProgressReporter::channel(1);
        drop(rx);
        reporter.start();
        reporter.job_settled(&job("a", true));
        reporter.finish();
    }

    #[test]
    fn test_empty_batch() {
        let (mut reporter, mut rx) = ProgressReporter::channel(0);
        reporter.start();
        reporter.finish();

        assert_eq!(rx.try_recv().unwrap().progress_percent, 0.0);
        assert_eq!(rx.try_recv().unwrap().progress_percent, 100.0);
    }
}
