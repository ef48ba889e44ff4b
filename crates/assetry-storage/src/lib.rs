//! Assetry Storage Library
//!
//! This crate provides the storage abstraction and its backends: Google Cloud Storage,
//! S3 and an in-memory store through `object_store`, and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are relative to the asset root and shared by all backends:
//!
//! - **Originals**: `{YYYY}/{MM}/{filename}`
//! - **Variants**: `size/{label}/{original key}`
//!
//! Keys must not contain `..` or a leading `/`. Conversion between keys and public URLs is
//! centralized in the `paths` module so URL handling stays consistent.

pub mod cloud;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod paths;
pub mod traits;

// Re-export commonly used types
pub use assetry_core::StorageBackend;
pub use cloud::CloudStorage;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use paths::{join_key, validate_key, PathResolver, VARIANT_DIR};
pub use traits::{content_type_for_key, ObjectMetadata, Storage, StorageError, StorageResult};
