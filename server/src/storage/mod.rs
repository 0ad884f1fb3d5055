//! Storage module
//!
//! Provides the filesystem blob store, storage key generation and
//! content checksums.

pub mod blob_store;
pub mod checksum;
pub mod keys;

pub use blob_store::BlobStore;
pub use checksum::{checksum_bytes, compute_checksum};
pub use keys::generate_key;
