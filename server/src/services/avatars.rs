//! Avatar service
//!
//! One avatar per user, stored as the "avatar" attachment of a User record.

use crate::config::AVATAR_ATTACHMENT_NAME;
use crate::database::{Blob, RecordRef};
use crate::error::Result;
use crate::services::attachments::{AttachmentsService, StoredFile, Upload};

#[derive(Clone)]
pub struct AvatarService {
    attachments: AttachmentsService,
}

impl AvatarService {
    pub fn new(attachments: AttachmentsService) -> Self {
        Self { attachments }
    }

    /// Store a new avatar for a user, replacing the current one
    pub async fn upload(&self, user_id: &str, upload: Upload) -> Result<Blob> {
        self.attachments
            .attach_upload(&RecordRef::user(user_id), AVATAR_ATTACHMENT_NAME, upload)
            .await
    }

    /// Read a user's avatar, verified against its stored checksum
    pub async fn fetch(&self, user_id: &str) -> Result<StoredFile> {
        self.attachments
            .open(&RecordRef::user(user_id), AVATAR_ATTACHMENT_NAME)
            .await
    }
}
