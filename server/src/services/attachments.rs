//! Attachments service
//!
//! Handles uploading a file as a named attachment of any record and reading
//! it back with checksum verification. Integrates Repository and BlobStore.

use crate::config::DEFAULT_CONTENT_TYPE;
use crate::database::{Blob, RecordRef, Repository};
use crate::error::{AppError, Result};
use crate::storage::{checksum_bytes, compute_checksum, generate_key, BlobStore};
use chrono::Utc;
use uuid::Uuid;

/// A file received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Verified blob content read back from storage
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub blob: Blob,
    pub data: Vec<u8>,
}

/// Service for managing attachments
#[derive(Clone)]
pub struct AttachmentsService {
    repo: Repository,
    blob_store: BlobStore,
}

impl AttachmentsService {
    pub fn new(repo: Repository, blob_store: BlobStore) -> Self {
        Self { repo, blob_store }
    }

    /// Store an upload and attach it to `record` under `name`.
    ///
    /// A previous attachment with the same name is replaced and its blob
    /// purged. The written file is removed again if any metadata step fails.
    pub async fn attach_upload(&self, record: &RecordRef, name: &str, upload: Upload) -> Result<Blob> {
        tracing::info!(
            "Creating attachment: {} for {} as {} (size: {} bytes)",
            upload.filename,
            record,
            name,
            upload.data.len()
        );

        let key = generate_key(&upload.filename);
        self.blob_store.save(&key, &upload.data).await?;

        let path = self.blob_store.path_for(&key)?;
        let Some(checksum) = compute_checksum(&path).await else {
            self.discard_file(&key).await;
            return Err(AppError::ChecksumUnavailable(key));
        };

        let blob = Blob {
            id: Uuid::new_v4().to_string(),
            key,
            filename: upload.filename,
            content_type: upload
                .content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            byte_size: upload.data.len() as i64,
            checksum,
            created_at: Utc::now(),
        };

        let replaced = match self.repo.record_and_attach(&blob, record, name).await {
            Ok(replaced) => replaced,
            Err(e) => {
                tracing::warn!(
                    "Could not record blob {} for {} as {}: {}",
                    blob.id,
                    record,
                    name,
                    e
                );
                self.discard_file(&blob.key).await;
                return Err(e);
            }
        };

        if let Some(old) = replaced {
            self.purge_blob(&old).await;
        }

        tracing::info!("Attachment created: {} -> blob {}", record, blob.id);

        Ok(blob)
    }

    /// Read the blob attached to `record` under `name`, verifying its checksum
    pub async fn open(&self, record: &RecordRef, name: &str) -> Result<StoredFile> {
        let blob = self
            .repo
            .resolve(record, name)
            .await?
            .ok_or_else(|| AppError::AttachmentNotFound {
                record: record.to_string(),
                name: name.to_string(),
            })?;

        let data = self.blob_store.read(&blob.key).await?;

        let actual = checksum_bytes(&data);
        if actual != blob.checksum {
            return Err(AppError::Integrity {
                key: blob.key,
                expected: blob.checksum,
                actual,
            });
        }

        Ok(StoredFile { blob, data })
    }

    /// Remove a file whose metadata never made it into the database
    async fn discard_file(&self, key: &str) {
        if let Err(e) = self.blob_store.delete(key).await {
            tracing::warn!("Orphaned blob file needs manual cleanup: {} ({})", key, e);
        }
    }

    /// Remove a blob that is no longer attached anywhere.
    /// Failures are logged and left for manual cleanup.
    async fn purge_blob(&self, blob: &Blob) {
        tracing::debug!("Purging replaced blob: {} (key: {})", blob.id, blob.key);

        if let Err(e) = self.repo.delete_blob(&blob.id).await {
            tracing::warn!("Orphaned blob row needs manual cleanup: {} ({})", blob.id, e);
            return;
        }
        self.discard_file(&blob.key).await;
    }
}
