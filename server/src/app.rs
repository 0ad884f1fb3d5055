//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are constructed here from explicit dependencies and made
//! available to handlers through AppState.

use crate::config::Config;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{AttachmentsService, AvatarService};
use crate::storage::BlobStore;
use sqlx::SqlitePool;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub avatars: AvatarService,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire services over an existing pool and blob store
    pub fn new(pool: SqlitePool, blob_store: BlobStore, max_upload_bytes: usize) -> Self {
        let repo = Repository::new(pool);
        let attachments = AttachmentsService::new(repo, blob_store);
        Self {
            avatars: AvatarService::new(attachments),
            max_upload_bytes,
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(config: &Config) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Storage root: {:?}", config.storage_root);

    let blob_store = BlobStore::new(config.storage_root.clone());
    blob_store.initialize().await?;

    let pool = create_pool(&config.database_path).await?;

    tracing::info!("Application initialized successfully");

    Ok(AppState::new(pool, blob_store, config.max_upload_bytes))
}
