//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local file logs with rotation
//! - Helper macros with consistent field names for batch events
//!
//! # Example
//!
//! ```no_run
//! use lectern::logging::init_logging;
//! use lectern::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export job
///
/// # Example
///
/// ```no_run
/// use lectern::log_job_start;
/// use lectern::domain::JobId;
///
/// let job_id = JobId::new("week-01").unwrap();
/// log_job_start!(&job_id, 3, 2);
/// ```
#[macro_export]
macro_rules! log_job_start {
    ($job_id:expr, $sessions:expr, $formats:expr) => {
        tracing::info!(
            job_id = %$job_id,
            sessions = $sessions,
            formats = $formats,
            "Starting export job"
        );
    };
}

/// Log the completion of an export job
///
/// # Example
///
/// ```no_run
/// use lectern::log_job_complete;
/// use std::time::Duration;
///
/// log_job_complete!("week-01", true, 4, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_job_complete {
    ($job_id:expr, $success:expr, $files:expr, $duration:expr) => {
        tracing::info!(
            job_id = %$job_id,
            success = $success,
            files = $files,
            duration_ms = $duration.as_millis() as u64,
            "Export job finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use lectern::log_error_with_context;
/// use lectern::domain::LecternError;
///
/// let error = LecternError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log batch progress
///
/// # Example
///
/// ```no_run
/// use lectern::log_batch_progress;
///
/// log_batch_progress!(3, 10);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($completed:expr, $total:expr) => {
        tracing::debug!(
            completed = $completed,
            total = $total,
            progress_pct = if $total == 0 {
                100.0
            } else {
                $completed as f64 / $total as f64 * 100.0
            },
            "Batch progress"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{JobId, LecternError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let job_id = JobId::new("week-01").unwrap();
        log_job_start!(&job_id, 2usize, 3usize);
        log_job_complete!(&job_id, true, 6usize, Duration::from_millis(12));
        log_error_with_context!(&LecternError::Other("boom".into()), "test");
        log_batch_progress!(1usize, 4usize);
        log_batch_progress!(0usize, 0usize);
    }
}
