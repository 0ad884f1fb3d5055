//! Content checksums
//!
//! SHA-256 over blob content, rendered as 64 lowercase hex characters.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Calculate SHA-256 hash of in-memory data
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Calculate SHA-256 hash of a file's content.
///
/// Returns `None` when the file cannot be opened or read. Callers must treat
/// that as "verification impossible", never as a match.
pub async fn compute_checksum(path: &Path) -> Option<String> {
    let mut file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Cannot open {:?} for checksum: {}", path, e);
            return None;
        }
    };

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    loop {
        match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) => {
                tracing::warn!("Cannot read {:?} for checksum: {}", path, e);
                return None;
            }
        }
    }

    Some(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(checksum_bytes(b"AAAAAAAAAA").len(), 64);
    }

    #[tokio::test]
    async fn test_file_digest_matches_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        assert_eq!(compute_checksum(&path).await, Some(checksum_bytes(&data)));
    }

    #[tokio::test]
    async fn test_digest_depends_on_content_not_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("same-name");

        std::fs::write(&path, b"before").unwrap();
        let first = compute_checksum(&path).await.unwrap();

        std::fs::write(&path, b"after").unwrap();
        let second = compute_checksum(&path).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(compute_checksum(&temp.path().join("nope")).await, None);
    }
}
