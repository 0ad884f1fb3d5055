//! Key-addressed blob storage
//!
//! Stores uploaded file content under a root directory, one file per key.
//!
//! Example: key "cat.png_1700000000000000000_1a2b3c4d" is stored at
//! "uploads/cat.png_1700000000000000000_1a2b3c4d"

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Filesystem blob store
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a new blob store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the blob store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Blob store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write content under `key`.
    ///
    /// The write goes through a temp file that is renamed into place, so a
    /// failed save never leaves a partial blob behind.
    pub async fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let temp_path = self.root.join(format!("{}.tmp", key));

        let written = Self::write_atomic(&path, &temp_path, data).await;
        if let Err(source) = written {
            if let Err(e) = fs::remove_file(&temp_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not remove temp file {:?}: {}", temp_path, e);
                }
            }
            return Err(AppError::Write {
                key: key.to_string(),
                source,
            });
        }

        tracing::debug!("Wrote blob: {} ({} bytes)", key, data.len());

        Ok(())
    }

    async fn write_atomic(path: &Path, temp_path: &Path, data: &[u8]) -> std::io::Result<()> {
        // Create parent directories
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(temp_path, path).await
    }

    /// Read data from blob store
    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;

        let mut file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::BlobNotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::new();
        file.read_to_end(&mut data).await?;

        tracing::debug!("Read blob: {} ({} bytes)", key, data.len());

        Ok(data)
    }

    /// Check if a blob exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Delete a blob
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Deleted blob: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()), // Already deleted
            Err(e) => Err(e.into()),
        }
    }

    /// Get file path for a key.
    ///
    /// Keys must be a single plain path segment so nothing escapes the root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if !valid {
            return Err(AppError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    /// Get blob store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}
