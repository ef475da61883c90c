//! Adapter factory
//!
//! This module builds the session store, converter and writer described by
//! the configuration.

use crate::adapters::converter::{BuiltinConverter, ExternalRenderer};
use crate::adapters::filesystem::LocalFileWriter;
use crate::adapters::session_store::FileSessionStore;
use crate::adapters::traits::{FormatConverter, OutputWriter, SessionStore};
use crate::config::schema::{ConverterConfig, LecternConfig, SessionsConfig};
use crate::domain::{LecternError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Collaborators needed by the batch manager
pub struct Adapters {
    pub store: Arc<dyn SessionStore>,
    pub converter: Arc<dyn FormatConverter>,
    pub writer: Arc<dyn OutputWriter>,
}

/// Create a session store from the `[sessions]` section
///
/// # Errors
///
/// Returns a configuration error if the root directory does not exist
pub fn create_session_store(config: &SessionsConfig) -> Result<Arc<dyn SessionStore>> {
    let root = Path::new(&config.root);
    if !root.is_dir() {
        return Err(LecternError::Configuration(format!(
            "sessions.root '{}' is not a directory",
            root.display()
        )));
    }

    tracing::info!(root = %root.display(), "Creating file session store");
    Ok(Arc::new(FileSessionStore::new(root)))
}

/// Create the format converter from the `[converter]` section
pub fn create_converter(config: &ConverterConfig) -> Arc<dyn FormatConverter> {
    let converter = match &config.pdf_command {
        Some(command) => {
            tracing::info!(command = %command, "PDF output enabled via external renderer");
            BuiltinConverter::new().with_pdf_renderer(ExternalRenderer::new(
                command.clone(),
                config.pdf_args.clone(),
                Duration::from_secs(config.timeout_seconds),
            ))
        }
        None => BuiltinConverter::new(),
    };
    Arc::new(converter)
}

/// Create the output writer
pub fn create_output_writer() -> Arc<dyn OutputWriter> {
    Arc::new(LocalFileWriter::new())
}

/// Create every adapter the batch manager needs
///
/// # Errors
///
/// Returns an error if any adapter cannot be created
pub fn create_adapters(config: &LecternConfig) -> Result<Adapters> {
    Ok(Adapters {
        store: create_session_store(&config.sessions)?,
        converter: create_converter(&config.converter),
        writer: create_output_writer(),
    })
}
