//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables take ENV_MUTEX so they do
//! not interfere with each other.

use lectern::adapters::create_adapters;
use lectern::config::load_config;
use lectern::core::export::BatchExportManager;
use lectern::domain::{ExportFormat, NamingStrategy};
use std::io::Write;
use std::sync::Mutex;
use tempfile::{NamedTempFile, TempDir};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in [
        "LECTERN_APPLICATION_LOG_LEVEL",
        "LECTERN_EXPORT_MAX_CONCURRENT_JOBS",
        "LECTERN_EXPORT_CONTINUE_ON_ERROR",
        "LECTERN_EXPORT_COMPRESS_OUTPUT",
        "LECTERN_EXPORT_MANIFEST_PATH",
        "LECTERN_SESSIONS_ROOT",
        "LECTERN_CONVERTER_PDF_COMMAND",
        "TEST_LECTERN_OUTPUT_DIR",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[[jobs]]
job_id = "intro"
session_ids = ["intro"]
formats = ["html"]
output_directory = "exports"
"#;

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[export]
parallel_exports = false
max_concurrent_jobs = 8
continue_on_error = false
create_manifest = true
compress_output = true
manifest_path = "out/manifest.json"

[sessions]
root = "content/sessions"

[converter]
pdf_command = "pandoc"
pdf_args = ["-o", "-"]
timeout_seconds = 30

[logging]
local_enabled = true
local_path = "var/log"
local_rotation = "hourly"

[[jobs]]
job_id = "week-01"
session_ids = ["intro", "ownership"]
formats = ["html", "pdf"]
output_directory = "exports/week-01"

[[jobs]]
job_id = "reader"
session_ids = ["intro", "ownership", "borrowing"]
formats = ["markdown"]
output_directory = "exports/reader"
merge_sessions = true
naming_strategy = { custom = "{job_id}_{timestamp}" }
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert!(!config.export.parallel_exports);
    assert_eq!(config.export.max_concurrent_jobs, 8);
    assert!(!config.export.continue_on_error);
    assert!(config.export.compress_output);
    assert_eq!(config.export.manifest_path, "out/manifest.json");
    assert_eq!(config.sessions.root, "content/sessions");
    assert_eq!(config.converter.pdf_command.as_deref(), Some("pandoc"));
    assert_eq!(config.converter.timeout_seconds, 30);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    assert_eq!(config.jobs.len(), 2);
    assert_eq!(config.jobs[0].formats, vec![ExportFormat::Html, ExportFormat::Pdf]);
    assert_eq!(config.jobs[0].naming_strategy, NamingStrategy::SessionBased);
    assert!(config.jobs[1].merge_sessions);
    assert_eq!(
        config.jobs[1].naming_strategy,
        NamingStrategy::Custom("{job_id}_{timestamp}".to_string())
    );

    let options = config.export.to_options();
    assert_eq!(options.effective_concurrency(), 1);
    assert!(options.compress_output);
}

#[test]
fn test_defaults_apply_to_minimal_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(config.export.parallel_exports);
    assert_eq!(config.export.max_concurrent_jobs, 4);
    assert!(config.export.continue_on_error);
    assert!(config.export.create_manifest);
    assert!(!config.export.compress_output);
    assert_eq!(config.sessions.root, "sessions");
    assert!(config.converter.pdf_command.is_none());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("LECTERN_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("LECTERN_EXPORT_MAX_CONCURRENT_JOBS", "12");
    std::env::set_var("LECTERN_EXPORT_CONTINUE_ON_ERROR", "false");
    std::env::set_var("LECTERN_EXPORT_COMPRESS_OUTPUT", "true");
    std::env::set_var("LECTERN_SESSIONS_ROOT", "/srv/sessions");
    std::env::set_var("LECTERN_CONVERTER_PDF_COMMAND", "wkhtmltopdf");

    let file = write_config(MINIMAL);
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.export.max_concurrent_jobs, 12);
    assert!(!config.export.continue_on_error);
    assert!(config.export.compress_output);
    assert_eq!(config.sessions.root, "/srv/sessions");
    assert_eq!(config.converter.pdf_command.as_deref(), Some("wkhtmltopdf"));
}

#[test]
fn test_env_override_is_validated() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("LECTERN_EXPORT_MAX_CONCURRENT_JOBS", "0");
    let file = write_config(MINIMAL);
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(result.unwrap_err().to_string().contains("max_concurrent_jobs"));
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("TEST_LECTERN_OUTPUT_DIR", "/tmp/lectern-out");
    let file = write_config(
        r#"
# output_directory = "${NOT_SET_BUT_COMMENTED}"
[[jobs]]
job_id = "intro"
session_ids = ["intro"]
formats = ["html"]
output_directory = "${TEST_LECTERN_OUTPUT_DIR}/intro"
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(
        config.jobs[0].output_directory,
        std::path::PathBuf::from("/tmp/lectern-out/intro")
    );
}

#[test]
fn test_missing_env_var_is_reported() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[[jobs]]
job_id = "intro"
session_ids = ["intro"]
formats = ["html"]
output_directory = "${TEST_LECTERN_OUTPUT_DIR}"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_LECTERN_OUTPUT_DIR"));
}

#[test]
fn test_invalid_configs_are_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        ("no jobs", "[export]\nmax_concurrent_jobs = 2\n"),
        (
            "unknown format",
            r#"
[[jobs]]
job_id = "a"
session_ids = ["s"]
formats = ["docx"]
output_directory = "out"
"#,
        ),
        (
            "duplicate job ids",
            r#"
[[jobs]]
job_id = "a"
session_ids = ["s"]
formats = ["html"]
output_directory = "out"

[[jobs]]
job_id = "a"
session_ids = ["t"]
formats = ["html"]
output_directory = "out"
"#,
        ),
        (
            "bad rotation",
            r#"
[logging]
local_rotation = "weekly"

[[jobs]]
job_id = "a"
session_ids = ["s"]
formats = ["html"]
output_directory = "out"
"#,
        ),
    ];

    for (name, content) in cases {
        let file = write_config(content);
        assert!(load_config(file.path()).is_err(), "{name} should be rejected");
    }
}

#[test]
fn test_missing_file() {
    let err = load_config("/definitely/not/here/lectern.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_configured_batch_runs_from_session_files() {
    let sessions = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    std::fs::write(
        sessions.path().join("intro.json"),
        r#"{ "title": "Intro", "content": "Hello **class**." }"#,
    )
    .unwrap();
    std::fs::write(sessions.path().join("ownership.md"), "# Ownership\n\nMoves.\n").unwrap();

    let content = format!(
        r#"
[sessions]
root = "{}"

[[jobs]]
job_id = "week-01"
session_ids = ["intro", "ownership"]
formats = ["markdown", "json"]
output_directory = "{}"
"#,
        sessions.path().display(),
        output.path().display()
    );

    let config = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        cleanup_env_vars();
        let file = write_config(&content);
        load_config(file.path()).unwrap()
    };

    let manager = BatchExportManager::from_adapters(create_adapters(&config).unwrap());
    let result = manager
        .execute(config.jobs.clone(), &config.export.to_options())
        .await
        .unwrap();

    assert!(result.is_successful());
    assert_eq!(result.total_files_created, 4);
    for name in ["intro.md", "intro.json", "ownership.md", "ownership.json"] {
        assert!(output.path().join(name).is_file(), "{name} missing");
    }
}
