//! Application configuration
//!
//! Central location for all configuration constants, resource limits,
//! and the runtime `Config` assembled from environment variables.

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

// ===== Server Defaults =====

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory holding blob content, one file per key
pub const DEFAULT_STORAGE_ROOT: &str = "./uploads";

/// Default sqlite database file
pub const DEFAULT_DATABASE_PATH: &str = "./avatars.db";

// ===== Upload Limits =====

/// Default maximum request body size for uploads (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Maximum number of UTF-8 bytes kept from a client filename when building a key.
/// Leaves room for `_{nanos}_{token}.tmp` within a 255-byte path segment.
pub const MAX_FILENAME_BYTES: usize = 200;

/// Content type recorded when the client does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ===== Attachment Roles =====

/// Attachment name used for user avatars
pub const AVATAR_ATTACHMENT_NAME: &str = "avatar";

/// Multipart form field carrying the avatar file
pub const AVATAR_FORM_FIELD: &str = "avatar";

// ===== Environment Variables =====

pub const ENV_ADDRESS: &str = "AVATARS_ADDRESS";
pub const ENV_PORT: &str = "AVATARS_PORT";
pub const ENV_STORAGE_ROOT: &str = "AVATARS_STORAGE_ROOT";
pub const ENV_DATABASE_PATH: &str = "AVATARS_DATABASE_PATH";
pub const ENV_MAX_UPLOAD_BYTES: &str = "AVATARS_MAX_UPLOAD_BYTES";

/// Runtime configuration for the service
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub storage_root: PathBuf,
    pub database_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    /// Unset variables fall back to the defaults above.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup(ENV_ADDRESS).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("{}={:?}: {}", ENV_PORT, raw, e)))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{}:{}", address, port)
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("{}={:?}: {}", ENV_ADDRESS, address, e)))?;

        let max_upload_bytes = match lookup(ENV_MAX_UPLOAD_BYTES) {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                AppError::Config(format!("{}={:?}: {}", ENV_MAX_UPLOAD_BYTES, raw, e))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind_addr,
            storage_root: lookup(ENV_STORAGE_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT)),
            database_path: lookup(ENV_DATABASE_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.storage_root, PathBuf::from(DEFAULT_STORAGE_ROOT));
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_ADDRESS, "127.0.0.1"),
            (ENV_PORT, "8080"),
            (ENV_STORAGE_ROOT, "/var/lib/avatars"),
            (ENV_MAX_UPLOAD_BYTES, "1024"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.storage_root, PathBuf::from("/var/lib/avatars"));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = Config::from_lookup(lookup_from(&[(ENV_PORT, "not-a-port")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
