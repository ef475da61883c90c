//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "lectern.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Lectern configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [sessions] root at your session files");
                println!("  2. Describe your exports as [[jobs]] entries");
                println!("  3. Validate configuration: lectern validate-config");
                println!("  4. Run export: lectern export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Lectern Configuration File

[sessions]
root = "sessions"

[[jobs]]
job_id = "intro"
session_ids = ["intro"]
formats = ["html", "markdown"]
output_directory = "exports"
"#
        .to_string()
    }

    /// Generate configuration with every option documented
    fn generate_config_with_examples() -> String {
        r##"# Lectern Configuration File
#
# Values may reference environment variables as ${VAR_NAME}.
# Any setting can also be overridden with LECTERN_<SECTION>_<KEY>,
# for example LECTERN_EXPORT_MAX_CONCURRENT_JOBS=8.

[application]
# trace, debug, info, warn, error
log_level = "info"

[export]
# Run jobs concurrently
parallel_exports = true
# Upper bound on jobs running at once (1-64)
max_concurrent_jobs = 4
# Keep going after a job fails; false stops dispatching new jobs
continue_on_error = true
# Record every output with size and checksum
create_manifest = true
manifest_path = "exports/lectern-manifest.json"
# Gzip each output file (adds .gz to the name)
compress_output = false

[sessions]
# Holds {session_id}.json ({ title, content, metadata }) or {session_id}.md
root = "sessions"

[converter]
# External renderer for PDF output. Receives Markdown on stdin and must
# write the PDF to stdout.
# pdf_command = "pandoc"
# pdf_args = ["--from", "markdown", "--to", "pdf", "-o", "-"]
timeout_seconds = 120

[logging]
local_enabled = false
local_path = "logs"
# daily, hourly, never
local_rotation = "daily"

# One file per session and format, named after the session id
[[jobs]]
job_id = "week-01"
session_ids = ["intro", "ownership"]
formats = ["html", "markdown"]
output_directory = "exports/week-01"
naming_strategy = "session_based"
include_metadata = true

# All sessions merged into a single document per format
[[jobs]]
job_id = "course-reader"
session_ids = ["intro", "ownership", "borrowing"]
formats = ["html", "json"]
output_directory = "exports/reader"
merge_sessions = true
template_name = "reader"
branding_options = { organization = "Example University", primary_color = "#1a4d8f" }
# Placeholders: {job_id} {timestamp} {format} {title} {session_id}
naming_strategy = { custom = "{job_id}_{timestamp}" }
"##
        .to_string()
    }
}
