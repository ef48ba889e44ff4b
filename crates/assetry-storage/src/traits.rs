//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use assetry_core::AssetError;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AssetError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AssetError::NotFound(key),
            StorageError::InvalidKey(msg) => AssetError::InvalidKey(msg),
            StorageError::ConfigError(msg) => AssetError::Config(msg),
            other => AssetError::Transport(other.to_string()),
        }
    }
}

/// Per-object metadata applied on write.
///
/// Read visibility is a backend setting (see `StorageSettings::object_acl`), not per object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub cache_control: String,
    pub content_type: String,
}

impl ObjectMetadata {
    /// Metadata with the given cache policy; content type guessed from `key`.
    pub fn for_key(key: &str, cache_control: impl Into<String>) -> Self {
        Self {
            cache_control: cache_control.into(),
            content_type: content_type_for_key(key),
        }
    }
}

/// MIME type derived from the key's extension.
pub fn content_type_for_key(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Storage abstraction trait
///
/// All storage backends (GCS, S3, in-memory, local filesystem) implement this trait.
/// Keys are canonical store keys: relative, slash-delimited, no leading `/` and no `..`.
/// Normalization of URLs and host paths into keys happens before calls reach a backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` at `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes, metadata: &ObjectMetadata) -> StorageResult<()>;

    /// Read the full object at `key`.
    ///
    /// Returns `StorageError::NotFound` when no object exists.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete the object at `key`
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists. Transport failures are errors, never `false`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
