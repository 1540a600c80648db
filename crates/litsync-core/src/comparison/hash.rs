//! Content hashing using SHA-256

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Context;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// SHA-256 hasher producing lowercase hex digests
pub struct ContentHasher;

impl ContentHasher {
    /// Hash an in-memory string
    #[must_use]
    pub fn hash_str(content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    /// Compute SHA-256 hash of a file by streaming its contents
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn hash_file(path: &Path) -> Result<String> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;

        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_str_known_value() {
        assert_eq!(
            ContentHasher::hash_str(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_file_and_str_hash_agree() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("note.md");
        fs::write(&file, "# Title\n\nBody\n").unwrap();

        let from_file = ContentHasher::hash_file(&file).unwrap();

        assert_eq!(from_file, ContentHasher::hash_str("# Title\n\nBody\n"));
    }

    #[test]
    fn test_hash_different_content() {
        assert_ne!(ContentHasher::hash_str("content 1"), ContentHasher::hash_str("content 2"));
    }

    #[test]
    fn test_hash_large_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("large.md");
        fs::write(&file, "x".repeat(1024 * 1024)).unwrap();

        assert_eq!(ContentHasher::hash_file(&file).unwrap().len(), 64);
    }

    #[test]
    fn test_hash_missing_file() {
        let tmp = TempDir::new().unwrap();

        assert!(ContentHasher::hash_file(&tmp.path().join("missing.md")).is_err());
    }
}
