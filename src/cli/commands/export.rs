//! Export command implementation
//!
//! This module implements the `export` command, which runs the jobs defined
//! in the configuration file as one batch.

use crate::adapters::factory::create_adapters;
use crate::config::{load_config, LecternConfig};
use crate::core::export::{BatchExportManager, BatchExportResult, BatchProgress};
use crate::domain::LecternError;
use clap::Args;
use std::collections::HashSet;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Only run these job IDs (comma-separated)
    #[arg(long)]
    pub job: Option<String>,

    /// Override the maximum number of concurrent jobs
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Stop dispatching jobs after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Gzip every output file
    #[arg(long)]
    pub compress: bool,

    /// Do not write a manifest
    #[arg(long)]
    pub no_manifest: bool,
}

impl ExportArgs {
    /// Apply command-line overrides to a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns a message if `--job` names a job that is not configured
    pub fn apply_overrides(&self, config: &mut LecternConfig) -> Result<(), String> {
        if let Some(selection) = &self.job {
            let wanted: HashSet<&str> = selection
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();

            let known: HashSet<&str> = config.jobs.iter().map(|j| j.job_id.as_str()).collect();
            let mut unknown: Vec<&str> = wanted.difference(&known).copied().collect();
            if !unknown.is_empty() {
                unknown.sort_unstable();
                return Err(format!("unknown job id(s): {}", unknown.join(", ")));
            }

            tracing::info!(jobs = ?wanted, "Restricting export to selected jobs");
            config.jobs.retain(|j| wanted.contains(j.job_id.as_str()));
        }

        if let Some(max) = self.max_concurrent {
            tracing::info!(max_concurrent_jobs = max, "Overriding concurrency from CLI");
            config.export.max_concurrent_jobs = max;
        }
        if self.fail_fast {
            config.export.continue_on_error = false;
        }
        if self.compress {
            config.export.compress_output = true;
        }
        if self.no_manifest {
            config.export.create_manifest = false;
        }
        Ok(())
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self
            .apply_overrides(&mut config)
            .and_then(|_| config.validate())
        {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(2);
        }

        if !self.yes {
            print_plan(&config);
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let adapters = match create_adapters(&config) {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create adapters");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let manager = BatchExportManager::from_adapters(adapters).with_shutdown_signal(shutdown_signal);
        let mut progress = manager.subscribe_progress();
        let printer = tokio::spawn(async move {
            while let Some(update) = progress.recv().await {
                print_progress(&update);
            }
        });

        println!("🚀 Starting export of {} job(s)...", config.jobs.len());
        println!();

        let options = config.export.to_options();
        let result = manager.execute(config.jobs.clone(), &options).await;
        if result.is_ok() {
            // Sender is dropped once the batch settles
            let _ = printer.await;
        } else {
            printer.abort();
        }

        let result = match result {
            Ok(r) => r,
            Err(e @ LecternError::Validation { .. }) => {
                tracing::error!(error = %e, "Job validation failed");
                eprintln!("❌ {e}");
                return Ok(2);
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("❌ Export failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&result);

        if let Some(manifest) = &result.manifest {
            if let Err(e) = manifest.save(&config.export.manifest_path) {
                crate::log_error_with_context!(&e, "Failed to write manifest");
                eprintln!("❌ Failed to write manifest: {e}");
                return Ok(5);
            }
            println!("📄 Manifest written to {}", config.export.manifest_path);
        }

        Ok(exit_code(&result))
    }
}

/// Exit code for a finished batch
pub fn exit_code(result: &BatchExportResult) -> i32 {
    if result.interrupted {
        130
    } else if result.is_successful() {
        0
    } else {
        1
    }
}

fn print_plan(config: &LecternConfig) {
    println!("Export Plan:");
    for job in &config.jobs {
        println!(
            "  {} - {} session(s) -> [{}] in {}{}",
            job.job_id,
            job.session_ids.len(),
            job.formats
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            job.output_directory.display(),
            if job.merge_sessions { " (merged)" } else { "" }
        );
    }
    println!(
        "  Concurrency: {}",
        config.export.to_options().effective_concurrency()
    );
    println!("  Continue on error: {}", config.export.continue_on_error);
    println!();
}

fn print_progress(update: &BatchProgress) {
    println!(
        "  [{:>5.1}%] {}/{} {}",
        update.progress_percent, update.completed_jobs, update.total_jobs, update.current_operation
    );
}

fn print_summary(result: &BatchExportResult) {
    println!();
    println!("📊 Export Summary:");
    println!("  Total Jobs: {}", result.total_jobs);
    println!("  Successful: {}", result.successful_jobs);
    println!("  Failed: {}", result.failed_jobs);
    println!("  Files Created: {}", result.total_files_created);
    println!("  Bytes Written: {}", result.total_bytes_written);
    println!("  Duration: {:.2}s", result.total_elapsed_time.as_secs_f64());
    println!("  Success Rate: {:.2}%", result.success_rate());
    println!();

    let failed: Vec<_> = result.job_results.iter().filter(|j| !j.success).collect();
    if !failed.is_empty() {
        println!("⚠️  Failed jobs:");
        for job in failed {
            println!(
                "  - {}: {}",
                job.job_id,
                job.error_message.as_deref().unwrap_or("unknown error")
            );
        }
        println!();
    }

    if result.interrupted {
        println!("⚠️  Export interrupted. Jobs not yet started were skipped.");
    } else if result.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}
