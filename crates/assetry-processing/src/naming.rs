//! Target directories and unique file names.

use assetry_core::AssetError;
use assetry_storage::{join_key, Storage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Marker in a file name that flags an upload as original-only.
const ORIGINAL_ONLY_MARKER: &str = "_o.";

/// Result of a name allocation.
///
/// Allocators may return just a file name or a key that already includes the directory;
/// the tag says which, so callers never have to guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocatedName {
    /// File name only; the caller joins it onto the target directory.
    Bare(String),
    /// Complete store key including the directory.
    Qualified(String),
}

impl AllocatedName {
    pub fn into_key(self, target_dir: &str) -> String {
        match self {
            AllocatedName::Bare(name) => join_key(target_dir, &name),
            AllocatedName::Qualified(key) => key.trim_start_matches('/').to_string(),
        }
    }
}

/// Allocates a store key that does not collide with an existing object.
#[async_trait]
pub trait NameAllocator: Send + Sync {
    async fn allocate(&self, filename: &str, target_dir: &str)
        -> Result<AllocatedName, AssetError>;
}

/// Directory new uploads are placed in.
pub trait TargetDirectory: Send + Sync {
    fn target_dir(&self) -> String;
}

/// `YYYY/MM/` of the upload time (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct DatedDirectory {
    fixed: Option<DateTime<Utc>>,
}

impl DatedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always use the month of `at`.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { fixed: Some(at) }
    }
}

impl TargetDirectory for DatedDirectory {
    fn target_dir(&self) -> String {
        self.fixed
            .unwrap_or_else(Utc::now)
            .format("%Y/%m/")
            .to_string()
    }
}

/// A constant directory.
#[derive(Debug, Clone)]
pub struct FixedDirectory(pub String);

impl TargetDirectory for FixedDirectory {
    fn target_dir(&self) -> String {
        self.0.clone()
    }
}

/// Probes `name.ext`, `name-1.ext`, `name-2.ext`, ... until a free key is found.
///
/// Two concurrent uploads of the same name can both see the same key as free.
pub struct SequentialNameAllocator {
    storage: Arc<dyn Storage>,
    max_attempts: u32,
}

impl SequentialNameAllocator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            max_attempts: MAX_NAME_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[async_trait]
impl NameAllocator for SequentialNameAllocator {
    async fn allocate(
        &self,
        filename: &str,
        target_dir: &str,
    ) -> Result<AllocatedName, AssetError> {
        let (stem, extension) = split_filename(filename);

        for attempt in 0..self.max_attempts {
            let candidate = if attempt == 0 {
                format!("{}{}", stem, extension)
            } else {
                format!("{}-{}{}", stem, attempt, extension)
            };
            let key = join_key(target_dir, &candidate);

            let taken = self
                .storage
                .exists(&key)
                .await
                .map_err(|e| AssetError::Allocation(format!("exists check for {}: {}", key, e)))?;

            if !taken {
                tracing::debug!(key = %key, attempt = attempt, "Allocated unique name");
                return Ok(AllocatedName::Qualified(key));
            }
        }

        Err(AssetError::Allocation(format!(
            "no free name for {} in {} after {} attempts",
            filename, target_dir, self.max_attempts
        )))
    }
}

/// Split a client file name into a sanitized stem and extension (with its dot).
pub fn split_filename(filename: &str) -> (String, String) {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let (stem, extension) = match base.rfind('.') {
        Some(idx) if idx > 0 => (&base[..idx], &base[idx..]),
        _ => (base, ""),
    };

    let stem = sanitize(stem);
    let stem = if stem.is_empty() { "file".to_string() } else { stem };
    (stem, sanitize(extension))
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// True when the key's file name contains `_o.`.
pub fn is_original_only(key: &str) -> bool {
    let filename = key.rsplit('/').next().unwrap_or(key);
    filename.contains(ORIGINAL_ONLY_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetry_storage::{CloudStorage, ObjectMetadata};
    use bytes::Bytes;
    use chrono::TimeZone;

    async fn put(storage: &CloudStorage, key: &str) {
        storage
            .put(key, Bytes::from_static(b"x"), &ObjectMetadata::for_key(key, "public"))
            .await
            .unwrap();
    }

    #[test]
    fn test_split_and_sanitize() {
        assert_eq!(split_filename("photo.jpg"), ("photo".into(), ".jpg".into()));
        assert_eq!(split_filename("My Photo (1).JPG"), ("My-Photo--1-".into(), ".JPG".into()));
        assert_eq!(split_filename("../../etc/passwd"), ("passwd".into(), "".into()));
        assert_eq!(split_filename("me@2x.png"), ("me@2x".into(), ".png".into()));
        assert_eq!(split_filename(".jpg"), (".jpg".into(), "".into()));
        assert_eq!(split_filename("archive.tar.gz"), ("archive.tar".into(), ".gz".into()));
    }

    #[test]
    fn test_original_only_marker() {
        assert!(is_original_only("2024/03/photo_o.jpg"));
        assert!(is_original_only("photo_o.png"));
        assert!(is_original_only("2024/03/photo_o.tar.gz"));
        assert!(!is_original_only("2024/03/photo.jpg"));
        assert!(!is_original_only("2024/03/photo_o-1.jpg"));
        assert!(!is_original_only("2024_o.x/03/photo.jpg"));
        assert!(!is_original_only("2024/03/photo_o"));
    }

    #[test]
    fn test_allocated_name_into_key() {
        assert_eq!(
            AllocatedName::Bare("a.jpg".into()).into_key("2024/03/"),
            "2024/03/a.jpg"
        );
        assert_eq!(
            AllocatedName::Qualified("2024/03/a.jpg".into()).into_key("2024/03/"),
            "2024/03/a.jpg"
        );
        // Qualified keys are never prefixed a second time
        assert_eq!(
            AllocatedName::Qualified("/2024/03/a.jpg".into()).into_key("2024/03/"),
            "2024/03/a.jpg"
        );
    }

    #[test]
    fn test_dated_directory() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(DatedDirectory::at(at).target_dir(), "2024/03/");

        let now = DatedDirectory::new().target_dir();
        assert_eq!(now.len(), "2024/03/".len());
        assert!(now.ends_with('/'));
    }

    #[tokio::test]
    async fn test_sequential_allocation() {
        let storage = CloudStorage::in_memory("bucket");
        let allocator = SequentialNameAllocator::new(Arc::new(storage.clone()));

        let name = allocator.allocate("a.jpg", "2024/03/").await.unwrap();
        assert_eq!(name, AllocatedName::Qualified("2024/03/a.jpg".into()));

        put(&storage, "2024/03/a.jpg").await;
        put(&storage, "2024/03/a-1.jpg").await;

        let name = allocator.allocate("a.jpg", "2024/03/").await.unwrap();
        assert_eq!(name, AllocatedName::Qualified("2024/03/a-2.jpg".into()));
    }

    #[tokio::test]
    async fn test_allocation_exhausted() {
        let storage = CloudStorage::in_memory("bucket");
        put(&storage, "d/a.jpg").await;
        put(&storage, "d/a-1.jpg").await;

        let allocator =
            SequentialNameAllocator::new(Arc::new(storage)).with_max_attempts(2);
        let err = allocator.allocate("a.jpg", "d").await.unwrap_err();
        assert!(matches!(err, AssetError::Allocation(_)));
    }
}
