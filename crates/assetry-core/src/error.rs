//! Error types module
//!
//! This module provides the error type surfaced by the asset adapter. Fatal ingest
//! failures (allocation, original write) and facade failures (not found, transport)
//! are unified under `AssetError`. Variant write failures are reported alongside a
//! successful ingest rather than returned as its error.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a missing key
    Debug,
    /// Warning level - for recoverable issues like a lost variant
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be reported by callers
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "ORIGINAL_WRITE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the operator
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Unique name allocation failed: {0}")]
    Allocation(String),

    #[error("Failed to store original {key}: {message}")]
    OriginalWrite { key: String, message: String },

    #[error("Failed to store variant {key}: {message}")]
    VariantWrite { key: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage transport error: {0}")]
    Transport(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn asset_error_static_metadata(
    err: &AssetError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AssetError::Allocation(_) => (
            "ALLOCATION_FAILED",
            true,
            Some("Retry the upload; the name space may be exhausted for this file name"),
            LogLevel::Error,
        ),
        AssetError::OriginalWrite { .. } => (
            "ORIGINAL_WRITE_FAILED",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AssetError::VariantWrite { .. } => (
            "VARIANT_WRITE_FAILED",
            true,
            Some("Re-ingest the original to regenerate its variants"),
            LogLevel::Warn,
        ),
        AssetError::NotFound(_) => ("NOT_FOUND", false, None, LogLevel::Debug),
        AssetError::Transport(_) => (
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AssetError::InvalidKey(_) => (
            "INVALID_KEY",
            false,
            Some("Pass a relative key, a path under the asset path or a public URL"),
            LogLevel::Debug,
        ),
        AssetError::PayloadTooLarge { .. } => (
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Upload a smaller file or raise MAX_UPLOAD_SIZE_MB"),
            LogLevel::Warn,
        ),
        AssetError::Config(_) => ("CONFIG_ERROR", false, None, LogLevel::Error),
        AssetError::Io(_) => (
            "IO_ERROR",
            true,
            Some("Check the upload path is readable"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AssetError {
    fn error_code(&self) -> &'static str {
        asset_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        asset_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        asset_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        asset_error_static_metadata(self).3
    }
}

impl AssetError {
    /// True for errors that must abort an ingest with no URL returned.
    pub fn is_fatal_to_ingest(&self) -> bool {
        !matches!(self, AssetError::VariantWrite { .. })
    }
}
