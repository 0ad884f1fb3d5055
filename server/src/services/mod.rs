//! Services module
//!
//! Business logic services that coordinate between the API, the repository
//! and the blob store.

pub mod attachments;
pub mod avatars;

pub use attachments::{AttachmentsService, StoredFile, Upload};
pub use avatars::AvatarService;
