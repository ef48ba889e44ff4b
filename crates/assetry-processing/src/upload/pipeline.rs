//! Ingest pipeline: allocate → read → store original → derive variants.
//!
//! The original is written before any variant task starts, so a failed original write
//! never leaves variant objects behind. Variant tasks are independent: one failing resize
//! or store is recorded in the report and the others carry on.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use assetry_core::{size_specs, AssetConfig, AssetError, SizeSpec, UploadedFile, VariantMode};
use assetry_storage::{
    content_type_for_key, validate_key, ObjectMetadata, PathResolver, Storage,
};
use bytes::Bytes;

use super::gather::{gather_best_effort, VariantTracker};
use super::types::{IngestOutcome, StoredVariant, VariantFailure, VariantReport, VariantResult};
use crate::image::ImageResizer;
use crate::naming::{
    is_original_only, DatedDirectory, NameAllocator, SequentialNameAllocator, TargetDirectory,
};
use crate::sizes::{SizeSpecSource, StaticSizes};
use crate::variants::VariantGenerator;

pub struct IngestPipeline {
    storage: Arc<dyn Storage>,
    paths: PathResolver,
    allocator: Arc<dyn NameAllocator>,
    target_dir: Arc<dyn TargetDirectory>,
    sizes: Arc<dyn SizeSpecSource>,
    generator: Arc<dyn VariantGenerator>,
    tracker: Arc<VariantTracker>,
    bucket: String,
    cache_control: String,
    max_upload_bytes: usize,
    variant_mode: VariantMode,
}

impl IngestPipeline {
    /// Pipeline with the default collaborators: dated directories, sequential naming,
    /// the configured size table and the `image` crate resizer.
    pub fn new(config: &AssetConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            allocator: Arc::new(SequentialNameAllocator::new(Arc::clone(&storage))),
            storage,
            paths: PathResolver::new(config),
            target_dir: Arc::new(DatedDirectory::new()),
            sizes: Arc::new(StaticSizes(config.image_sizes().clone())),
            generator: Arc::new(ImageResizer),
            tracker: Arc::new(VariantTracker::new()),
            bucket: config.bucket().to_string(),
            cache_control: config.cache_control(),
            max_upload_bytes: config.max_upload_bytes(),
            variant_mode: config.variant_mode(),
        }
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn NameAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_target_directory(mut self, target_dir: Arc<dyn TargetDirectory>) -> Self {
        self.target_dir = target_dir;
        self
    }

    pub fn with_size_source(mut self, sizes: Arc<dyn SizeSpecSource>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn VariantGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_variant_mode(mut self, mode: VariantMode) -> Self {
        self.variant_mode = mode;
        self
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }

    /// Store an upload and derive its variants.
    ///
    /// `target_dir_hint` is only logged; the directory always comes from the
    /// configured [`TargetDirectory`].
    pub async fn ingest(
        &self,
        file: &UploadedFile,
        target_dir_hint: Option<&str>,
    ) -> Result<IngestOutcome, AssetError> {
        let target_dir = self.target_dir.target_dir();
        if let Some(hint) = target_dir_hint {
            if hint.trim_matches('/') != target_dir.trim_matches('/') {
                tracing::debug!(hint = %hint, target_dir = %target_dir, "Ignoring target directory hint");
            }
        }

        let specs = size_specs(&self.sizes.image_sizes());

        let key = self
            .allocator
            .allocate(&file.name, &target_dir)
            .await?
            .into_key(&target_dir);
        validate_key(&key).map_err(|e| AssetError::Allocation(e.to_string()))?;

        let data = self.read_upload(file).await?;
        self.store_original(&key, data.clone(), file.content_type.as_deref())
            .await?;

        let url = self.paths.public_url(&key);
        let original_only = is_original_only(&key);

        if original_only || specs.is_empty() {
            tracing::debug!(
                key = %key,
                original_only = original_only,
                "Skipping variant generation"
            );
            return Ok(IngestOutcome {
                url,
                key,
                original_only,
                variants: VariantReport::default(),
            });
        }

        let tasks = specs.into_iter().map(|spec| self.variant_task(spec, &key, data.clone()));

        let variants = match self.variant_mode {
            VariantMode::Await => gather_best_effort(tasks).await,
            VariantMode::Background => {
                let mut pending = 0;
                for task in tasks {
                    self.tracker.spawn(task).await;
                    pending += 1;
                }
                VariantReport {
                    pending,
                    ..VariantReport::default()
                }
            }
        };

        Ok(IngestOutcome {
            url,
            key,
            original_only,
            variants,
        })
    }

    /// Wait for background variant tasks and collect their outcomes.
    pub async fn flush_variants(&self) -> VariantReport {
        self.tracker.flush().await
    }

    async fn read_upload(&self, file: &UploadedFile) -> Result<Bytes, AssetError> {
        let size = tokio::fs::metadata(&file.path).await?.len();
        if size > self.max_upload_bytes as u64 {
            return Err(AssetError::PayloadTooLarge {
                size,
                max: self.max_upload_bytes as u64,
            });
        }

        let data = tokio::fs::read(&file.path).await?;
        Ok(Bytes::from(data))
    }

    async fn store_original(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), AssetError> {
        let mut metadata = ObjectMetadata::for_key(key, self.cache_control.as_str());
        if let Some(content_type) = content_type {
            metadata.content_type = content_type.to_string();
        }

        let size_bytes = data.len();
        let start = Instant::now();

        match self.storage.put(key, data, &metadata).await {
            Ok(()) => {
                tracing::info!(
                    key = %key,
                    bucket = %self.bucket,
                    size_bytes = size_bytes,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Stored original"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    key = %key,
                    bucket = %self.bucket,
                    error = %e,
                    "Failed to store original"
                );
                Err(AssetError::OriginalWrite {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn variant_task(
        &self,
        spec: SizeSpec,
        original_key: &str,
        data: Bytes,
    ) -> impl Future<Output = VariantResult> + Send + 'static {
        let storage = Arc::clone(&self.storage);
        let generator = Arc::clone(&self.generator);
        let key = self.paths.variant_key(&spec.label, original_key);
        let url = self.paths.public_url(&key);
        let cache_control = self.cache_control.clone();
        let bucket = self.bucket.clone();

        async move {
            let start = Instant::now();
            let failure = |error: String| {
                tracing::warn!(
                    key = %key,
                    label = %spec.label,
                    error = %error,
                    "Variant generation failed"
                );
                VariantFailure {
                    label: spec.label.clone(),
                    key: key.clone(),
                    error,
                }
            };

            let resized = match generator.resize(data, spec.dimensions).await {
                Ok(resized) => resized,
                Err(e) => return Err(failure(format!("resize: {:#}", e))),
            };

            let size_bytes = resized.len();
            let metadata = ObjectMetadata {
                cache_control,
                content_type: content_type_for_key(&key),
            };
            if let Err(e) = storage.put(&key, resized, &metadata).await {
                return Err(failure(format!("store: {}", e)));
            }

            tracing::info!(
                key = %key,
                bucket = %bucket,
                label = %spec.label,
                size_bytes = size_bytes,
                duration_ms = start.elapsed().as_millis() as u64,
                "Stored variant"
            );

            Ok(StoredVariant {
                label: spec.label,
                key,
                url,
            })
        }
    }
}
