//! Verify command implementation
//!
//! Re-checks every file listed in a manifest.

use crate::config::load_config;
use crate::core::export::Manifest;
use crate::core::verification::Verifier;
use clap::Args;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Manifest to verify (defaults to `export.manifest_path` from the config)
    #[arg(short, long)]
    pub manifest: Option<String>,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let manifest_path = match &self.manifest {
            Some(path) => path.clone(),
            None => match load_config(config_path) {
                Ok(config) => config.export.manifest_path,
                Err(e) => {
                    eprintln!("❌ No --manifest given and configuration could not be loaded: {e}");
                    return Ok(2);
                }
            },
        };

        tracing::info!(manifest = %manifest_path, "Verifying manifest");
        println!("🔍 Verifying exports listed in {manifest_path}");
        println!();

        let manifest = match Manifest::load(&manifest_path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let report = Verifier::new().verify_manifest(&manifest).await;
        println!("{}", report.format_summary());

        Ok(if report.is_success() { 0 } else { 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_manifest() {
        let args = VerifyArgs {
            manifest: Some("/no/such/manifest.json".to_string()),
        };
        assert_eq!(args.execute("unused.toml").await.unwrap(), 2);
    }
}
