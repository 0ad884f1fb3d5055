//! Database models
//!
//! Rust structs representing database entities.
//! Blob serializes with camelCase keys for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Stored file content metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub id: String,
    /// Storage key, also the file name under the blob store root
    pub key: String,
    /// Original client-supplied filename, informational only
    pub filename: String,
    /// Client-declared MIME type
    pub content_type: String,
    pub byte_size: i64,
    /// SHA-256 of the file content, hex encoded
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

/// Named link from an owner record to a blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    /// Role label such as "avatar"
    pub name: String,
    pub record_type: String,
    pub record_id: String,
    pub blob_id: String,
    pub created_at: DateTime<Utc>,
}

/// Kind of record that can own attachments.
///
/// Persisted as an opaque text tag; the registry only ever compares tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    User,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "User",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for RecordType {
    fn from(tag: &str) -> Self {
        match tag {
            "User" => Self::User,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polymorphic reference to the record owning an attachment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub record_type: RecordType,
    pub record_id: String,
}

impl RecordRef {
    pub fn new(record_type: RecordType, record_id: impl Into<String>) -> Self {
        Self {
            record_type,
            record_id: record_id.into(),
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self::new(RecordType::User, user_id)
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.record_type, self.record_id)
    }
}

impl Attachment {
    /// Owner of this attachment
    pub fn record(&self) -> RecordRef {
        RecordRef::new(RecordType::from(self.record_type.as_str()), &self.record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_tag_round_trip() {
        assert_eq!(RecordType::from("User"), RecordType::User);
        assert_eq!(
            RecordType::from("Organization"),
            RecordType::Other("Organization".to_string())
        );
        assert_eq!(RecordType::Other("Team".into()).as_str(), "Team");
    }

    #[test]
    fn test_blob_serializes_camel_case() {
        let blob = Blob {
            id: "b1".into(),
            key: "cat.png_1_00000000".into(),
            filename: "cat.png".into(),
            content_type: "image/png".into(),
            byte_size: 10,
            checksum: "abc".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&blob).unwrap();

        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["byteSize"], 10);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("content_type").is_none());
    }
}
