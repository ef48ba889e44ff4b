//! Host-facing asset adapter.
//!
//! Every identifier a host hands back (public URL, asset-path-prefixed path or bare key)
//! goes through the same [`PathResolver`] before reaching storage, for reads, deletes,
//! existence checks and raw saves alike.

use std::sync::Arc;

use assetry_core::{AssetConfig, AssetError, StoredAssetRef, UploadedFile, VariantMode};
use assetry_storage::{create_storage, ObjectMetadata, PathResolver, Storage};
use bytes::Bytes;

use crate::naming::{NameAllocator, TargetDirectory};
use crate::sizes::SizeSpecSource;
use crate::upload::{IngestOutcome, IngestPipeline, VariantReport};
use crate::variants::VariantGenerator;

/// Something that identifies a stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocator {
    /// Public URL, path under the asset path, or store key.
    Identifier(String),
    /// Reference handed back by the host.
    Stored(StoredAssetRef),
}

impl AssetLocator {
    pub fn as_str(&self) -> &str {
        match self {
            AssetLocator::Identifier(identifier) => identifier,
            AssetLocator::Stored(stored) => &stored.path,
        }
    }
}

impl From<&str> for AssetLocator {
    fn from(identifier: &str) -> Self {
        AssetLocator::Identifier(identifier.to_string())
    }
}

impl From<String> for AssetLocator {
    fn from(identifier: String) -> Self {
        AssetLocator::Identifier(identifier)
    }
}

impl From<StoredAssetRef> for AssetLocator {
    fn from(stored: StoredAssetRef) -> Self {
        AssetLocator::Stored(stored)
    }
}

impl From<&StoredAssetRef> for AssetLocator {
    fn from(stored: &StoredAssetRef) -> Self {
        AssetLocator::Stored(stored.clone())
    }
}

/// Request handling hook for hosts that route asset requests through the adapter.
///
/// Issued URLs are absolute and point straight at the object store, so there is
/// nothing to serve: requests are handed back untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServePassThrough;

impl ServePassThrough {
    pub fn handle<R>(&self, request: R) -> R {
        request
    }
}

pub struct AssetAdapter {
    config: Arc<AssetConfig>,
    storage: Arc<dyn Storage>,
    pipeline: IngestPipeline,
}

impl AssetAdapter {
    pub fn new(config: AssetConfig, storage: Arc<dyn Storage>) -> Self {
        let pipeline = IngestPipeline::new(&config, Arc::clone(&storage));
        Self {
            config: Arc::new(config),
            storage,
            pipeline,
        }
    }

    /// Build an adapter with the storage backend selected by `config`.
    pub async fn from_config(config: AssetConfig) -> Result<Self, AssetError> {
        config
            .validate()
            .map_err(|e| AssetError::Config(e.to_string()))?;
        let storage = create_storage(&config).await?;

        tracing::info!(
            backend = %storage.backend_type(),
            bucket = %config.bucket(),
            asset_domain = %config.asset_domain(),
            asset_path = %config.asset_path(),
            "Asset adapter initialized"
        );

        Ok(Self::new(config, storage))
    }

    pub fn with_name_allocator(mut self, allocator: Arc<dyn NameAllocator>) -> Self {
        self.pipeline = self.pipeline.with_allocator(allocator);
        self
    }

    pub fn with_target_directory(mut self, target_dir: Arc<dyn TargetDirectory>) -> Self {
        self.pipeline = self.pipeline.with_target_directory(target_dir);
        self
    }

    pub fn with_size_source(mut self, sizes: Arc<dyn SizeSpecSource>) -> Self {
        self.pipeline = self.pipeline.with_size_source(sizes);
        self
    }

    pub fn with_variant_generator(mut self, generator: Arc<dyn VariantGenerator>) -> Self {
        self.pipeline = self.pipeline.with_generator(generator);
        self
    }

    pub fn with_variant_mode(mut self, mode: VariantMode) -> Self {
        self.pipeline = self.pipeline.with_variant_mode(mode);
        self
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn paths(&self) -> &PathResolver {
        self.pipeline.paths()
    }

    /// Store an upload and its variants, returning the original's public URL.
    pub async fn ingest(
        &self,
        file: &UploadedFile,
        target_dir_hint: Option<&str>,
    ) -> Result<IngestOutcome, AssetError> {
        self.pipeline.ingest(file, target_dir_hint).await
    }

    /// Wait for variant tasks started in background mode.
    pub async fn flush_variants(&self) -> VariantReport {
        self.pipeline.flush_variants().await
    }

    /// Store `data` at `target_path` as-is and return its public URL.
    pub async fn save_raw(&self, data: Bytes, target_path: &str) -> Result<String, AssetError> {
        let key = self.paths().resolve(target_path)?;
        let metadata = ObjectMetadata::for_key(&key, self.pipeline.cache_control());
        let size_bytes = data.len();

        self.storage
            .put(&key, data, &metadata)
            .await
            .map_err(|e| AssetError::OriginalWrite {
                key: key.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(key = %key, size_bytes = size_bytes, "Stored raw asset");
        Ok(self.paths().public_url(&key))
    }

    pub async fn exists(&self, filename: &str, target_dir: &str) -> Result<bool, AssetError> {
        let key = self.paths().resolve_in(target_dir, filename)?;
        Ok(self.storage.exists(&key).await?)
    }

    pub async fn read(&self, locator: impl Into<AssetLocator>) -> Result<Bytes, AssetError> {
        let locator = locator.into();
        let key = self.paths().resolve(locator.as_str())?;
        Ok(self.storage.get(&key).await?)
    }

    pub async fn delete(&self, locator: impl Into<AssetLocator>) -> Result<(), AssetError> {
        let locator = locator.into();
        let key = self.paths().resolve(locator.as_str())?;
        self.storage.delete(&key).await?;
        tracing::info!(key = %key, "Deleted asset");
        Ok(())
    }

    /// Public URL for an identifier.
    pub fn url_for(&self, locator: impl Into<AssetLocator>) -> Result<String, AssetError> {
        let locator = locator.into();
        let key = self.paths().resolve(locator.as_str())?;
        Ok(self.paths().public_url(&key))
    }

    pub fn serve(&self) -> ServePassThrough {
        ServePassThrough
    }
}
