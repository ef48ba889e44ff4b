//! Configuration module
//!
//! `AssetConfig` is built once at startup (from the environment or programmatically) and
//! shared read-only by every component. Domain and path values are normalized here so the
//! rest of the workspace can concatenate them without re-checking slashes.

use std::env;
use std::str::FromStr;

use crate::models::ImageSizes;
use crate::storage_types::StorageBackend;

/// Cache lifetime applied to every stored object when none is configured (31 days).
pub const DEFAULT_MAX_AGE_SECS: u64 = 2_678_400;

const MAX_UPLOAD_SIZE_MB: usize = 25;

/// Predefined ACL sent with every object write unless disabled.
pub const DEFAULT_OBJECT_ACL: &str = "public-read";
const DEFAULT_GCS_HOST: &str = "storage.googleapis.com";

/// How variant derivation is scheduled relative to the ingest call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariantMode {
    /// Ingest waits for every variant task and reports their outcomes.
    #[default]
    Await,
    /// Variant tasks keep running after ingest returns; outcomes are collected on flush.
    Background,
}

impl FromStr for VariantMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "await" | "sync" => Ok(VariantMode::Await),
            "background" | "async" => Ok(VariantMode::Background),
            _ => Err(anyhow::anyhow!("Invalid variant mode: {}", s)),
        }
    }
}

/// Backend selection and backend-specific settings.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub gcs_project_id: Option<String>,
    pub gcs_key_path: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    /// Predefined ACL for written objects (`x-goog-acl` / `x-amz-acl`). `None` leaves
    /// visibility to the bucket policy, as buckets with uniform access require.
    pub object_acl: Option<String>,
}

impl StorageSettings {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            gcs_project_id: None,
            gcs_key_path: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: None,
            object_acl: Some(DEFAULT_OBJECT_ACL.to_string()),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self::new(StorageBackend::Gcs)
    }
}

/// Asset adapter configuration.
#[derive(Clone, Debug)]
pub struct AssetConfig {
    bucket: String,
    asset_domain: String,
    asset_path: String,
    insecure: bool,
    max_age_secs: u64,
    max_upload_bytes: usize,
    variant_mode: VariantMode,
    image_sizes: ImageSizes,
    storage: StorageSettings,
}

impl AssetConfig {
    /// Configuration for `bucket` with every other value at its default.
    ///
    /// The asset domain defaults to `storage.googleapis.com/<bucket>/`.
    pub fn new(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let asset_domain = normalize_domain(&format!("{}/{}", DEFAULT_GCS_HOST, bucket));
        Self {
            bucket,
            asset_domain,
            asset_path: "/".to_string(),
            insecure: false,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            max_upload_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            variant_mode: VariantMode::default(),
            image_sizes: ImageSizes::new(),
            storage: StorageSettings::default(),
        }
    }

    pub fn with_asset_domain(mut self, domain: &str) -> Self {
        self.asset_domain = normalize_domain(domain);
        self
    }

    pub fn with_asset_path(mut self, path: &str) -> Self {
        self.asset_path = normalize_asset_path(path);
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = secs;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_variant_mode(mut self, mode: VariantMode) -> Self {
        self.variant_mode = mode;
        self
    }

    pub fn with_image_sizes(mut self, sizes: ImageSizes) -> Self {
        self.image_sizes = sizes;
        self
    }

    pub fn with_storage(mut self, storage: StorageSettings) -> Self {
        self.storage = storage;
        self
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::Gcs,
        };

        let bucket = match lookup("ASSET_BUCKET").or_else(|| lookup("GCS_BUCKET")) {
            Some(bucket) if !bucket.trim().is_empty() => bucket.trim().to_string(),
            _ if matches!(backend, StorageBackend::Local | StorageBackend::Memory) => {
                "assets".to_string()
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "ASSET_BUCKET must be set for the {} storage backend",
                    backend
                ))
            }
        };

        let storage = StorageSettings {
            backend,
            gcs_project_id: lookup("GCS_PROJECT_ID"),
            gcs_key_path: lookup("GCS_KEY_PATH"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            object_acl: parse_object_acl(lookup("ASSET_OBJECT_ACL")),
        };

        let mut config = AssetConfig::new(bucket).with_storage(storage);

        // The insecure flag only applies to an explicitly configured domain; the default
        // bucket domain is always served over https.
        let insecure = lookup("ASSET_INSECURE")
            .unwrap_or_else(|| "false".to_string())
            .to_lowercase()
            .parse()
            .unwrap_or(false);
        match lookup("ASSET_DOMAIN") {
            Some(domain) if !domain.trim().is_empty() => {
                config = config.with_asset_domain(&domain).with_insecure(insecure);
            }
            _ if insecure => {
                tracing::warn!("ASSET_INSECURE is ignored without ASSET_DOMAIN");
            }
            _ => {}
        }

        if let Some(path) = lookup("ASSET_PATH") {
            config = config.with_asset_path(&path);
        }

        let max_age = lookup("ASSET_MAX_AGE")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_MAX_AGE_SECS);

        let max_upload_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let max_upload_bytes = max_upload_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", max_upload_mb)
        })?;

        let variant_mode = match lookup("VARIANT_MODE") {
            Some(s) => s.parse::<VariantMode>()?,
            None => VariantMode::default(),
        };

        let image_sizes = match (lookup("IMAGE_SIZES"), lookup("IMAGE_SIZES_PATH")) {
            (Some(json), _) => parse_image_sizes(&json)?,
            (None, Some(path)) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to read IMAGE_SIZES_PATH {}: {}", path, e)
                })?;
                parse_image_sizes(&json)?
            }
            (None, None) => ImageSizes::new(),
        };

        let config = config
            .with_max_age(max_age)
            .with_max_upload_bytes(max_upload_bytes)
            .with_variant_mode(variant_mode)
            .with_image_sizes(image_sizes);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }
        if self.asset_domain.contains("://") {
            return Err(anyhow::anyhow!(
                "ASSET_DOMAIN must not include a scheme, got {}",
                self.asset_domain
            ));
        }
        match self.storage.backend {
            StorageBackend::Local if self.storage.local_storage_path.is_none() => Err(
                anyhow::anyhow!("LOCAL_STORAGE_PATH must be set for the local storage backend"),
            ),
            StorageBackend::S3 if self.storage.s3_region.is_none() => Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set for the s3 storage backend"
            )),
            _ => Ok(()),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Domain authority, always ending with `/`.
    pub fn asset_domain(&self) -> &str {
        &self.asset_domain
    }

    /// URL and key prefix, always starting and ending with `/`.
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    pub fn scheme(&self) -> &'static str {
        if self.insecure {
            "http"
        } else {
            "https"
        }
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// Cache-Control header value applied to every stored object.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.max_age_secs)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn variant_mode(&self) -> VariantMode {
        self.variant_mode
    }

    pub fn image_sizes(&self) -> &ImageSizes {
        &self.image_sizes
    }

    pub fn storage(&self) -> &StorageSettings {
        &self.storage
    }
}

fn parse_object_acl(value: Option<String>) -> Option<String> {
    match value {
        None => Some(DEFAULT_OBJECT_ACL.to_string()),
        Some(acl) => {
            let acl = acl.trim();
            if acl.is_empty() || acl.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(acl.to_string())
            }
        }
    }
}

fn parse_image_sizes(json: &str) -> Result<ImageSizes, anyhow::Error> {
    serde_json::from_str(json).map_err(|e| anyhow::anyhow!("Invalid image size table: {}", e))
}

fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    if domain.ends_with('/') {
        domain.to_string()
    } else {
        format!("{}/", domain)
    }
}

fn normalize_asset_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimensions;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_follow_bucket() {
        let config = AssetConfig::new("my-bucket");
        assert_eq!(config.asset_domain(), "storage.googleapis.com/my-bucket/");
        assert_eq!(config.asset_path(), "/");
        assert_eq!(config.scheme(), "https");
        assert_eq!(config.max_age_secs(), DEFAULT_MAX_AGE_SECS);
        assert_eq!(config.cache_control(), "public, max-age=2678400");
        assert_eq!(config.variant_mode(), VariantMode::Await);
    }

    #[test]
    fn normalizes_domain_and_path() {
        let config = AssetConfig::new("b")
            .with_asset_domain("cdn.example.com")
            .with_asset_path("assets");
        assert_eq!(config.asset_domain(), "cdn.example.com/");
        assert_eq!(config.asset_path(), "/assets/");

        let config = config.with_asset_path("/assets/").with_asset_domain("x.com/b/");
        assert_eq!(config.asset_path(), "/assets/");
        assert_eq!(config.asset_domain(), "x.com/b/");

        assert_eq!(AssetConfig::new("b").with_asset_path("").asset_path(), "/");
    }

    #[test]
    fn from_lookup_reads_all_values() {
        let config = AssetConfig::from_lookup(lookup_from(&[
            ("ASSET_BUCKET", "media"),
            ("ASSET_DOMAIN", "storage.example.com/media"),
            ("ASSET_PATH", "/assets"),
            ("ASSET_INSECURE", "true"),
            ("ASSET_MAX_AGE", "60"),
            ("MAX_UPLOAD_SIZE_MB", "2"),
            ("VARIANT_MODE", "background"),
            ("IMAGE_SIZES", r#"{"s": {"width": 300}}"#),
            ("GCS_PROJECT_ID", "proj"),
            ("GCS_KEY_PATH", "/secrets/key.json"),
        ]))
        .unwrap();

        assert_eq!(config.bucket(), "media");
        assert_eq!(config.asset_domain(), "storage.example.com/media/");
        assert_eq!(config.asset_path(), "/assets/");
        assert_eq!(config.scheme(), "http");
        assert_eq!(config.max_age_secs(), 60);
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
        assert_eq!(config.variant_mode(), VariantMode::Background);
        assert_eq!(config.image_sizes()["s"], Dimensions::new(Some(300), None));
        assert_eq!(config.storage().backend, StorageBackend::Gcs);
        assert_eq!(config.storage().gcs_project_id.as_deref(), Some("proj"));
    }

    #[test]
    fn insecure_requires_explicit_domain() {
        let config = AssetConfig::from_lookup(lookup_from(&[
            ("ASSET_BUCKET", "media"),
            ("ASSET_INSECURE", "true"),
        ]))
        .unwrap();
        assert!(!config.insecure());
        assert_eq!(config.asset_domain(), "storage.googleapis.com/media/");
    }

    #[test]
    fn zero_max_age_falls_back_to_default() {
        let config = AssetConfig::from_lookup(lookup_from(&[
            ("ASSET_BUCKET", "media"),
            ("ASSET_MAX_AGE", "0"),
        ]))
        .unwrap();
        assert_eq!(config.max_age_secs(), DEFAULT_MAX_AGE_SECS);
    }

    #[test]
    fn bucket_required_for_remote_backends() {
        assert!(AssetConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(AssetConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "memory")])).is_ok());
    }

    #[test]
    fn backend_specific_validation() {
        let err = AssetConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "local")]))
            .unwrap_err();
        assert!(err.to_string().contains("LOCAL_STORAGE_PATH"));

        let err = AssetConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "s3"),
            ("ASSET_BUCKET", "media"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("S3_REGION"));
    }

    #[test]
    fn rejects_scheme_in_domain() {
        let err = AssetConfig::from_lookup(lookup_from(&[
            ("ASSET_BUCKET", "media"),
            ("ASSET_DOMAIN", "https://cdn.example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn image_sizes_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"m": {{"width": 600, "height": 400}}}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = AssetConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("IMAGE_SIZES_PATH", path.as_str()),
        ]))
        .unwrap();
        assert_eq!(config.image_sizes()["m"], Dimensions::new(Some(600), Some(400)));
    }

    #[test]
    fn invalid_image_sizes_is_an_error() {
        let err = AssetConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("IMAGE_SIZES", "not json"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("image size table"));
    }

    #[test]
    fn oversized_upload_limit_is_an_error() {
        let err = AssetConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("MAX_UPLOAD_SIZE_MB", "18446744073709551615"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_SIZE_MB"));
    }

    #[test]
    fn object_acl_defaults_to_public_read() {
        let config =
            AssetConfig::from_lookup(lookup_from(&[("ASSET_BUCKET", "media")])).unwrap();
        assert_eq!(config.storage().object_acl.as_deref(), Some("public-read"));

        let config = AssetConfig::from_lookup(lookup_from(&[
            ("ASSET_BUCKET", "media"),
            ("ASSET_OBJECT_ACL", "none"),
        ]))
        .unwrap();
        assert_eq!(config.storage().object_acl, None);

        let config = AssetConfig::from_lookup(lookup_from(&[
            ("ASSET_BUCKET", "media"),
            ("ASSET_OBJECT_ACL", "publicRead"),
        ]))
        .unwrap();
        assert_eq!(config.storage().object_acl.as_deref(), Some("publicRead"));
    }
}
