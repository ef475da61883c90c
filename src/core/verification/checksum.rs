//! Checksum calculation for output verification

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Calculate SHA-256 checksum of raw bytes
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use lectern::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"# Intro\n");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Calculate SHA-256 checksum and size of a file on disk
///
/// The file is streamed, so large outputs are never held in memory.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read
pub fn calculate_checksum_file(path: &Path) -> std::io::Result<(String, u64)> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((format!("{:x}", hasher.finalize()), size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_calculate_checksum_bytes_known_value() {
        assert_eq!(
            calculate_checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_calculate_checksum_bytes_differs() {
        let a = calculate_checksum_bytes(b"Test data");
        let b = calculate_checksum_bytes(b"Test data!");
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_file_checksum_matches_bytes() {
        let file = NamedTempFile::new().unwrap();
        let data = vec![7u8; 200_000];
        std::fs::write(file.path(), &data).unwrap();

        let (checksum, size) = calculate_checksum_file(file.path()).unwrap();
        assert_eq!(size, 200_000);
        assert_eq!(checksum, calculate_checksum_bytes(&data));
    }

    #[test]
    fn test_file_checksum_missing_file() {
        assert!(calculate_checksum_file(Path::new("/no/such/lectern/file")).is_err());
    }
}
