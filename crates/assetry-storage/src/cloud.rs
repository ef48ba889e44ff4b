use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;

#[cfg(feature = "storage-gcs")]
const GCS_ACL_HEADER: &str = "x-goog-acl";
#[cfg(feature = "storage-s3")]
const S3_ACL_HEADER: &str = "x-amz-acl";

/// Object storage backed by the `object_store` crate (GCS, S3 or in-memory).
#[derive(Clone)]
pub struct CloudStorage {
    store: Arc<dyn ObjectStore>,
    backend: StorageBackend,
    bucket: String,
}

impl CloudStorage {
    /// Wrap an already-built object store.
    pub fn from_store(store: Arc<dyn ObjectStore>, backend: StorageBackend, bucket: String) -> Self {
        CloudStorage {
            store,
            backend,
            bucket,
        }
    }

    /// Create a Google Cloud Storage backend
    ///
    /// # Arguments
    /// * `bucket` - GCS bucket name
    /// * `key_path` - Optional service account key file; otherwise the environment's
    ///   application default credentials are used
    ///
    /// * `object_acl` - Predefined ACL sent as `x-goog-acl` on every request; `None` for
    ///   buckets with uniform bucket-level access, which reject ACL headers
    #[cfg(feature = "storage-gcs")]
    pub fn gcs(
        bucket: String,
        key_path: Option<String>,
        object_acl: Option<&str>,
    ) -> StorageResult<Self> {
        use object_store::gcp::GoogleCloudStorageBuilder;

        let mut builder = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .with_client_options(acl_client_options(GCS_ACL_HEADER, object_acl)?);
        if let Some(ref path) = key_path {
            builder = builder.with_service_account_path(path.clone());
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::from_store(Arc::new(store), StorageBackend::Gcs, bucket))
    }

    /// Create an S3 backend
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `object_acl` - Canned ACL sent as `x-amz-acl` on every request; `None` when the
    ///   bucket has ACLs disabled
    #[cfg(feature = "storage-s3")]
    pub fn s3(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        object_acl: Option<&str>,
    ) -> StorageResult<Self> {
        use object_store::aws::AmazonS3Builder;

        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone())
            .with_client_options(acl_client_options(S3_ACL_HEADER, object_acl)?);

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::from_store(Arc::new(store), StorageBackend::S3, bucket))
    }

    /// Process-local store, used for tests and dry runs.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        Self::from_store(
            Arc::new(InMemory::new()),
            StorageBackend::Memory,
            bucket.into(),
        )
    }

    fn put_options(metadata: &ObjectMetadata) -> PutOptions {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::CacheControl,
            metadata.cache_control.clone().into(),
        );
        attributes.insert(Attribute::ContentType, metadata.content_type.clone().into());
        PutOptions {
            attributes,
            ..Default::default()
        }
    }
}

/// Default request headers carrying a predefined ACL, so every written object gets it.
#[cfg(any(feature = "storage-gcs", feature = "storage-s3"))]
fn acl_headers(header: &'static str, acl: Option<&str>) -> StorageResult<http::HeaderMap> {
    let mut headers = http::HeaderMap::new();
    if let Some(acl) = acl {
        let value = http::HeaderValue::from_str(acl)
            .map_err(|e| StorageError::ConfigError(format!("Invalid object ACL {:?}: {}", acl, e)))?;
        headers.insert(http::HeaderName::from_static(header), value);
    }
    Ok(headers)
}

#[cfg(any(feature = "storage-gcs", feature = "storage-s3"))]
fn acl_client_options(
    header: &'static str,
    acl: Option<&str>,
) -> StorageResult<object_store::ClientOptions> {
    let headers = acl_headers(header, acl)?;
    if let Some(acl) = acl {
        tracing::debug!(header = header, acl = %acl, "Applying predefined object ACL");
    }
    Ok(object_store::ClientOptions::new().with_default_headers(headers))
}

#[async_trait]
impl Storage for CloudStorage {
    async fn put(&self, key: &str, data: Bytes, metadata: &ObjectMetadata) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), Self::put_options(metadata))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = %self.backend,
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            cache_control = %metadata.cache_control,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object download successful"
        );

        Ok(bytes)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object delete failed"
                );
                StorageError::DeleteFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
