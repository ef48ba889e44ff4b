#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{CloudStorage, Storage, StorageBackend, StorageError, StorageResult};
use assetry_core::AssetConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &AssetConfig) -> StorageResult<Arc<dyn Storage>> {
    let settings = config.storage();

    match settings.backend {
        #[cfg(feature = "storage-gcs")]
        StorageBackend::Gcs => {
            if let Some(ref project) = settings.gcs_project_id {
                tracing::debug!(project = %project, bucket = %config.bucket(), "Using GCS project");
            }
            let storage =
                CloudStorage::gcs(
                    config.bucket().to_string(),
                    settings.gcs_key_path.clone(),
                    settings.object_acl.as_deref(),
                )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-gcs"))]
        StorageBackend::Gcs => Err(StorageError::ConfigError(
            "GCS storage backend not available (storage-gcs feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = settings.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let storage = CloudStorage::s3(
                config.bucket().to_string(),
                region,
                settings.s3_endpoint.clone(),
                settings.object_acl.as_deref(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = settings.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => Ok(Arc::new(CloudStorage::in_memory(config.bucket()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetry_core::StorageSettings;

    #[tokio::test]
    async fn creates_memory_backend() {
        let config =
            AssetConfig::new("b").with_storage(StorageSettings::new(StorageBackend::Memory));
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn creates_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = StorageSettings::new(StorageBackend::Local);
        settings.local_storage_path = Some(dir.path().to_string_lossy().to_string());

        let storage = create_storage(&AssetConfig::new("b").with_storage(settings))
            .await
            .unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn local_backend_requires_path() {
        let config =
            AssetConfig::new("b").with_storage(StorageSettings::new(StorageBackend::Local));
        assert!(matches!(
            create_storage(&config).await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
