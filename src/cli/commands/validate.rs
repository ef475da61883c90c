//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Lectern configuration file.

use crate::config::load_config;
use crate::domain::NamingStrategy;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates, so any failure here is reported with
    /// exit code 2.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Sessions Root: {}", config.sessions.root);
        println!(
            "  PDF Renderer: {}",
            config.converter.pdf_command.as_deref().unwrap_or("(none)")
        );
        println!(
            "  Concurrency: {}",
            config.export.to_options().effective_concurrency()
        );
        println!("  Continue on error: {}", config.export.continue_on_error);
        println!("  Compress output: {}", config.export.compress_output);
        if config.export.create_manifest {
            println!("  Manifest: {}", config.export.manifest_path);
        }
        println!("  Jobs: {}", config.jobs.len());
        for job in &config.jobs {
            let naming = match &job.naming_strategy {
                NamingStrategy::SessionBased => "session_based".to_string(),
                NamingStrategy::ContentBased => "content_based".to_string(),
                NamingStrategy::Sequential => "sequential".to_string(),
                NamingStrategy::Custom(p) => format!("custom \"{p}\""),
            };
            println!(
                "    - {}: {} session(s), {} format(s), naming {}",
                job.job_id,
                job.session_ids.len(),
                job.formats.len(),
                naming
            );
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_configuration_error() {
        let code = ValidateArgs {}
            .execute("/no/such/lectern.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[jobs]]
job_id = "a"
session_ids = ["s1"]
formats = ["markdown"]
output_directory = "out"
"#
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
