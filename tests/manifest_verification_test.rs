//! Integration tests for manifest persistence and verification
//!
//! A batch is exported, its manifest saved and reloaded, and the files on
//! disk are then checked against it.

use lectern::adapters::{BuiltinConverter, InMemorySessionStore, LocalFileWriter};
use lectern::core::export::{BatchExportManager, Manifest};
use lectern::core::verification::Verifier;
use lectern::domain::{BatchExportJob, BatchExportOptions, ExportFormat};
use std::sync::Arc;
use tempfile::TempDir;

async fn export_batch(dir: &TempDir, compress: bool) -> Manifest {
    let store = InMemorySessionStore::new()
        .with_session("s1", "Intro", "Welcome.")
        .with_session("s2", "Traits", "Shared behaviour.");
    let manager = BatchExportManager::new(
        Arc::new(store),
        Arc::new(BuiltinConverter::new()),
        Arc::new(LocalFileWriter::new()),
    );

    let jobs = vec![
        BatchExportJob::builder("notes")
            .sessions(["s1", "s2"])
            .format(ExportFormat::Html)
            .format(ExportFormat::Markdown)
            .output_directory(dir.path().join("notes"))
            .build()
            .unwrap(),
        BatchExportJob::builder("broken")
            .session("nope")
            .format(ExportFormat::Text)
            .output_directory(dir.path().join("broken"))
            .build()
            .unwrap(),
    ];
    let options = BatchExportOptions {
        compress_output: compress,
        ..Default::default()
    };

    let result = manager.execute(jobs, &options).await.unwrap();
    assert_eq!(result.successful_jobs, 1);
    result.manifest.unwrap()
}

#[tokio::test]
async fn test_saved_manifest_verifies() {
    let dir = TempDir::new().unwrap();
    let manifest = export_batch(&dir, false).await;

    let path = dir.path().join("meta").join("manifest.json");
    manifest.save(&path).unwrap();
    let loaded = Manifest::load(&path).unwrap();
    assert_eq!(loaded, manifest);

    assert_eq!(loaded.successful_exports().count(), 4);
    assert_eq!(loaded.totals.total_files, 4);
    let bytes: u64 = loaded.successful_exports().map(|(_, e)| e.size).sum();
    assert_eq!(bytes, loaded.totals.total_bytes);

    let report = Verifier::new().verify_manifest(&loaded).await;
    assert!(report.is_success(), "{}", report.format_summary());
    assert_eq!(report.passed, 4);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn test_compressed_outputs_verify() {
    let dir = TempDir::new().unwrap();
    let manifest = export_batch(&dir, true).await;

    for (_, export) in manifest.successful_exports() {
        let path = export.path.as_ref().unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("gz"));
        assert_eq!(std::fs::metadata(path).unwrap().len(), export.size);
    }

    let report = Verifier::new().verify_manifest(&manifest).await;
    assert!(report.is_success());
}

#[tokio::test]
async fn test_tampered_file_fails_verification() {
    let dir = TempDir::new().unwrap();
    let manifest = export_batch(&dir, false).await;

    let tampered = dir.path().join("notes").join("s1.html");
    assert!(tampered.is_file());
    let original = std::fs::read(&tampered).unwrap();
    let mut changed = original.clone();
    changed[0] ^= 0x20;
    std::fs::write(&tampered, &changed).unwrap();

    let report = Verifier::new().verify_manifest(&manifest).await;
    assert!(!report.is_success());
    assert_eq!(report.failed, 1);
    assert_eq!(report.passed, 3);

    let failure = &report.failures[0];
    assert_eq!(failure.job_id.as_str(), "notes");
    assert_eq!(failure.format, ExportFormat::Html);
    assert_eq!(failure.path.as_deref(), Some(tampered.as_path()));
    assert!(failure.reason.contains("checksum"));
    assert_ne!(failure.expected_checksum, failure.actual_checksum);
}

#[tokio::test]
async fn test_deleted_file_fails_verification() {
    let dir = TempDir::new().unwrap();
    let manifest = export_batch(&dir, false).await;

    std::fs::remove_file(dir.path().join("notes").join("s2.md")).unwrap();

    let report = Verifier::new().verify_manifest(&manifest).await;
    assert_eq!(report.failed, 1);
    assert!(report.failures[0].reason.contains("cannot read"));
    assert!(report.failures[0].actual_checksum.is_none());
}
