//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::LecternConfig;
use crate::domain::errors::LecternError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into LecternConfig
/// 4. Applies environment variable overrides (LECTERN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use lectern::config::loader::load_config;
///
/// let config = load_config("lectern.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LecternConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LecternError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        LecternError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: LecternConfig = toml::from_str(&contents)
        .map_err(|e| LecternError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        LecternError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    tracing::debug!(
        path = %path.display(),
        jobs = config.jobs.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| LecternError::Other(format!("invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !input.ends_with('\n') {
        result.pop();
    }

    if !missing_vars.is_empty() {
        return Err(LecternError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides using LECTERN_* prefix
///
/// Environment variables follow the pattern: LECTERN_<SECTION>_<KEY>
/// For example: LECTERN_EXPORT_MAX_CONCURRENT_JOBS, LECTERN_SESSIONS_ROOT
fn apply_env_overrides(config: &mut LecternConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("LECTERN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Some(val) = env_bool("LECTERN_EXPORT_PARALLEL_EXPORTS") {
        config.export.parallel_exports = val;
    }
    if let Ok(val) = std::env::var("LECTERN_EXPORT_MAX_CONCURRENT_JOBS") {
        if let Ok(max) = val.parse() {
            config.export.max_concurrent_jobs = max;
        }
    }
    if let Some(val) = env_bool("LECTERN_EXPORT_CONTINUE_ON_ERROR") {
        config.export.continue_on_error = val;
    }
    if let Some(val) = env_bool("LECTERN_EXPORT_CREATE_MANIFEST") {
        config.export.create_manifest = val;
    }
    if let Some(val) = env_bool("LECTERN_EXPORT_COMPRESS_OUTPUT") {
        config.export.compress_output = val;
    }
    if let Ok(val) = std::env::var("LECTERN_EXPORT_MANIFEST_PATH") {
        config.export.manifest_path = val;
    }

    // Session store overrides
    if let Ok(val) = std::env::var("LECTERN_SESSIONS_ROOT") {
        config.sessions.root = val;
    }

    // Converter overrides
    if let Ok(val) = std::env::var("LECTERN_CONVERTER_PDF_COMMAND") {
        config.converter.pdf_command = Some(val);
    }
    if let Ok(val) = std::env::var("LECTERN_CONVERTER_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.converter.timeout_seconds = secs;
        }
    }

    // Logging overrides
    if let Some(val) = env_bool("LECTERN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("LECTERN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("LECTERN_TEST_SUBST_VAR", "test_value");
        let input = "root = \"${LECTERN_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "root = \"test_value\"");
        std::env::remove_var("LECTERN_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("LECTERN_TEST_MISSING_VAR");
        let input = "root = \"${LECTERN_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("LECTERN_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("LECTERN_TEST_COMMENTED_VAR");
        let input = "# root = \"${LECTERN_TEST_COMMENTED_VAR}\"\nx = 1\n";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-lectern.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[export]
max_concurrent_jobs = 2
continue_on_error = false

[sessions]
root = "content/sessions"

[[jobs]]
job_id = "intro"
session_ids = ["s1"]
formats = ["html", "pdf"]
output_directory = "out"
naming_strategy = "content_based"

[[jobs]]
job_id = "course"
session_ids = ["s1", "s2", "s3"]
formats = ["html"]
output_directory = "out"
merge_sessions = true
naming_strategy = { custom = "course_{timestamp}" }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.export.max_concurrent_jobs, 2);
        assert!(!config.export.continue_on_error);
        assert_eq!(config.sessions.root, "content/sessions");
        assert_eq!(config.jobs.len(), 2);
        assert!(config.jobs[1].merge_sessions);
    }
}
