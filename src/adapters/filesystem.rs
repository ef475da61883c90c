//! Local filesystem output writer

use super::traits::{OutputWriter, WriteOutcome};
use crate::core::verification::checksum::calculate_checksum_bytes;
use crate::domain::ExportError;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Writes output files to the local filesystem
///
/// Files are created with create-new semantics, so an existing file is
/// never overwritten. Writes run on the blocking thread pool.
#[derive(Debug, Clone, Default)]
pub struct LocalFileWriter;

impl LocalFileWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self
    }

    /// Check that `path` stays inside `root`
    pub fn ensure_within(root: &Path, path: &Path) -> Result<(), ExportError> {
        let relative = path.strip_prefix(root).map_err(|_| {
            ExportError::Io(format!(
                "refusing to write {} outside output directory {}",
                path.display(),
                root.display()
            ))
        })?;

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.as_os_str().is_empty() {
            return Err(ExportError::Io(format!(
                "refusing to write {} outside output directory {}",
                path.display(),
                root.display()
            )));
        }
        Ok(())
    }

    fn write_blocking(path: PathBuf, bytes: Vec<u8>, compress: bool) -> Result<WriteOutcome, ExportError> {
        let data = if compress {
            let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()?
        } else {
            bytes
        };

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| ExportError::Io(format!("{}: {e}", path.display())))?;
        Self::fill_or_remove(file, &path, &data)?;

        Ok(WriteOutcome {
            size: data.len() as u64,
            checksum: calculate_checksum_bytes(&data),
        })
    }
}

impl LocalFileWriter {
    /// Write `data` into a freshly created file, deleting it if the write fails
    fn fill_or_remove(mut file: impl Write, path: &Path, data: &[u8]) -> Result<(), ExportError> {
        let written = file.write_all(data).and_then(|_| file.flush());
        drop(file);

        if let Err(e) = written {
            if let Err(remove_err) = std::fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "Failed to remove partially written file"
                );
            }
            return Err(ExportError::Io(format!("{}: {e}", path.display())));
        }
        Ok(())
    }
}

#[async_trait]
impl OutputWriter for LocalFileWriter {
    async fn write(
        &self,
        root: &Path,
        path: &Path,
        bytes: Vec<u8>,
        compress: bool,
    ) -> Result<WriteOutcome, ExportError> {
        Self::ensure_within(root, path)?;

        let target = path.to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || Self::write_blocking(target, bytes, compress))
            .await
            .map_err(|e| ExportError::Io(format!("write task failed: {e}")))??;

        tracing::debug!(
            path = %path.display(),
            size = outcome.size,
            compressed = compress,
            "Wrote export file"
        );
        Ok(outcome)
    }
}
