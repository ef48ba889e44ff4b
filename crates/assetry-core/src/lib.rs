//! Assetry Core Library
//!
//! This crate provides the configuration, error types and data models shared by the
//! storage, processing and CLI crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    AssetConfig, StorageSettings, VariantMode, DEFAULT_MAX_AGE_SECS, DEFAULT_OBJECT_ACL,
};
pub use error::{AssetError, ErrorMetadata, LogLevel};
pub use models::{size_specs, Dimensions, ImageSizes, SizeSpec, StoredAssetRef, UploadedFile};
pub use storage_types::StorageBackend;
