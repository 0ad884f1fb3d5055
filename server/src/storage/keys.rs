//! Storage key generation
//!
//! Keys look like `{filename}_{unix_nanos}_{token}` and are always a single
//! path segment under the blob store root.

use crate::config::MAX_FILENAME_BYTES;
use chrono::Utc;
use rand::Rng;

/// Generate a storage key for an uploaded file
pub fn generate_key(original_filename: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let token: u32 = rand::thread_rng().gen();
    format!("{}_{}_{:08x}", sanitize_filename(original_filename), nanos, token)
}

/// Sanitize filename to prevent path traversal attacks.
/// Truncates on a char boundary to at most `MAX_FILENAME_BYTES` bytes.
pub fn sanitize_filename(filename: &str) -> String {
    let mut safe = String::new();
    for c in filename
        .chars()
        .filter(|c| *c != '/' && *c != '\\' && !c.is_control())
    {
        if safe.len() + c.len_utf8() > MAX_FILENAME_BYTES {
            break;
        }
        safe.push(c);
    }

    if safe.is_empty() {
        "file".to_string()
    } else {
        safe
    }
}
