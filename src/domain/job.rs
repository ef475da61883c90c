//! Export job and batch option models

use super::format::ExportFormat;
use super::ids::{JobId, SessionId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Policy used to derive output file names
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// `{session_id}.{ext}`
    #[default]
    SessionBased,
    /// `{sanitized_title}.{ext}`
    ContentBased,
    /// `export_{YYYYMMDD_HHMMSS}.{ext}`
    Sequential,
    /// Caller pattern with `{job_id}`, `{timestamp}`, `{format}`, `{title}`, `{session_id}`
    Custom(String),
}

/// One export request spanning sessions and formats
///
/// Immutable once submitted to a batch.
///
/// # Examples
///
/// ```
/// use lectern::domain::job::{BatchExportJob, NamingStrategy};
/// use lectern::domain::format::ExportFormat;
///
/// let job = BatchExportJob::builder("intro")
///     .session("s1")
///     .format(ExportFormat::Html)
///     .format(ExportFormat::Pdf)
///     .output_directory("exports")
///     .naming_strategy(NamingStrategy::ContentBased)
///     .build()
///     .unwrap();
///
/// assert_eq!(job.formats.len(), 2);
/// assert!(!job.merge_sessions);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchExportJob {
    /// Caller-supplied identifier, unique within a batch
    pub job_id: JobId,

    /// Sessions to export, in order
    pub session_ids: Vec<SessionId>,

    /// Output formats, attempted in this order
    pub formats: Vec<ExportFormat>,

    /// Destination directory
    pub output_directory: PathBuf,

    /// Output naming policy
    #[serde(default)]
    pub naming_strategy: NamingStrategy,

    /// Concatenate all sessions into one document before conversion
    #[serde(default)]
    pub merge_sessions: bool,

    /// Converter template name (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,

    /// Ask the converter to include session metadata
    #[serde(default)]
    pub include_metadata: bool,

    /// Branding options handed to the converter (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding_options: Option<serde_json::Value>,
}

impl BatchExportJob {
    /// Creates a builder for a job with the given ID
    pub fn builder(job_id: impl Into<String>) -> BatchExportJobBuilder {
        BatchExportJobBuilder::new(job_id)
    }

    /// Converter options carried verbatim from the job
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            template_name: self.template_name.clone(),
            include_metadata: self.include_metadata,
            branding_options: self.branding_options.clone(),
        }
    }
}

/// Builder for [`BatchExportJob`]
#[derive(Debug, Default)]
pub struct BatchExportJobBuilder {
    job_id: String,
    session_ids: Vec<String>,
    formats: Vec<ExportFormat>,
    output_directory: Option<PathBuf>,
    naming_strategy: NamingStrategy,
    merge_sessions: bool,
    template_name: Option<String>,
    include_metadata: bool,
    branding_options: Option<serde_json::Value>,
}

impl BatchExportJobBuilder {
    /// Creates a new builder
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    /// Appends a session
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_ids.push(session_id.into());
        self
    }

    /// Appends several sessions
    pub fn sessions<I, S>(mut self, session_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.session_ids
            .extend(session_ids.into_iter().map(Into::into));
        self
    }

    /// Appends an output format
    pub fn format(mut self, format: ExportFormat) -> Self {
        self.formats.push(format);
        self
    }

    /// Sets the output directory
    pub fn output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(dir.into());
        self
    }

    /// Sets the naming strategy
    pub fn naming_strategy(mut self, strategy: NamingStrategy) -> Self {
        self.naming_strategy = strategy;
        self
    }

    /// Enables or disables session merging
    pub fn merge_sessions(mut self, merge: bool) -> Self {
        self.merge_sessions = merge;
        self
    }

    /// Sets the converter template name
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    /// Enables metadata output
    pub fn include_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Sets branding options
    pub fn branding_options(mut self, branding: serde_json::Value) -> Self {
        self.branding_options = Some(branding);
        self
    }

    /// Builds the job
    ///
    /// Only identifier syntax is checked here; batch-level rules (non-empty
    /// sessions and formats, uniqueness, writable directory) are enforced
    /// by the manager before execution.
    ///
    /// # Errors
    ///
    /// Returns an error if an identifier is blank or the output directory is missing
    pub fn build(self) -> Result<BatchExportJob, String> {
        let session_ids = self
            .session_ids
            .into_iter()
            .map(SessionId::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchExportJob {
            job_id: JobId::new(self.job_id)?,
            session_ids,
            formats: self.formats,
            output_directory: self
                .output_directory
                .ok_or("output_directory is required")?,
            naming_strategy: self.naming_strategy,
            merge_sessions: self.merge_sessions,
            template_name: self.template_name,
            include_metadata: self.include_metadata,
            branding_options: self.branding_options,
        })
    }
}

/// Options passed through to the format converter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionOptions {
    /// Template name
    pub template_name: Option<String>,
    /// Include session metadata in the output
    pub include_metadata: bool,
    /// Opaque branding settings
    pub branding_options: Option<serde_json::Value>,
}

/// Options applying to a whole batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchExportOptions {
    /// Run jobs concurrently; when false, one job runs at a time
    pub parallel_exports: bool,

    /// Upper bound on simultaneously running jobs
    pub max_concurrent_jobs: usize,

    /// Keep dispatching jobs after a job fails
    pub continue_on_error: bool,

    /// Attach a manifest to the result
    pub create_manifest: bool,

    /// Gzip each output file
    pub compress_output: bool,
}

impl BatchExportOptions {
    /// Number of jobs allowed to run at once
    pub fn effective_concurrency(&self) -> usize {
        if self.parallel_exports {
            self.max_concurrent_jobs
        } else {
            1
        }
    }
}

impl Default for BatchExportOptions {
    fn default() -> Self {
        Self {
            parallel_exports: true,
            max_concurrent_jobs: 4,
            continue_on_error: true,
            create_manifest: true,
            compress_output: false,
        }
    }
}
