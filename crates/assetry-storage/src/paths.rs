//! Store keys and public URLs.
//!
//! Every object is addressed by a store key relative to the asset root. Public URLs are
//! `scheme://` + asset domain + asset path (without its leading `/`) + key, and are
//! never stored: they are rebuilt from the key whenever needed.

use assetry_core::AssetConfig;

use crate::traits::{StorageError, StorageResult};

/// Path segment under which resized variants live.
pub const VARIANT_DIR: &str = "size";

/// Computes public URLs and variant keys, and turns caller identifiers back into keys.
#[derive(Clone, Debug)]
pub struct PathResolver {
    /// `scheme://domain/`, always ending with `/`.
    origin: String,
    /// Asset path, always starting and ending with `/`.
    asset_path: String,
    /// `origin` followed by the asset path.
    public_base: String,
}

impl PathResolver {
    pub fn new(config: &AssetConfig) -> Self {
        let origin = format!("{}://{}", config.scheme(), config.asset_domain());
        let asset_path = config.asset_path().to_string();
        let public_base = format!("{}{}", origin, asset_path.trim_start_matches('/'));
        Self {
            origin,
            asset_path,
            public_base,
        }
    }

    /// URL prefix shared by every public URL.
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    /// Public URL for a store key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.public_base, key.trim_start_matches('/'))
    }

    /// Store key of the `label` variant of `key`.
    pub fn variant_key(&self, label: &str, key: &str) -> String {
        format!("{}/{}/{}", VARIANT_DIR, label, key.trim_start_matches('/'))
    }

    /// Normalize a public URL, asset-path-prefixed path or bare key into a store key.
    ///
    /// The configured `scheme://domain` prefix is stripped first; then a single asset
    /// path prefix, or failing that a single leading `/`. URLs for any other scheme or
    /// host are rejected.
    pub fn resolve(&self, identifier: &str) -> StorageResult<String> {
        let identifier = identifier.trim();
        let path = match identifier.strip_prefix(self.origin.as_str()) {
            Some(rest) => format!("/{}", rest.trim_start_matches('/')),
            None => identifier.to_string(),
        };

        let key = if path.starts_with('/') && path.starts_with(self.asset_path.as_str()) {
            &path[self.asset_path.len()..]
        } else {
            path.strip_prefix('/').unwrap_or(&path)
        };

        if key.contains("://") {
            return Err(StorageError::InvalidKey(format!(
                "identifier is not under {}: {}",
                self.public_base, identifier
            )));
        }
        validate_key(key)?;
        Ok(key.to_string())
    }

    /// Normalize `filename` inside `target_dir`, where the directory may be given in any
    /// form [`resolve`](Self::resolve) accepts (key, asset-path-prefixed path or URL).
    pub fn resolve_in(&self, target_dir: &str, filename: &str) -> StorageResult<String> {
        let dir = target_dir.trim().trim_end_matches('/');
        let filename = filename.trim_start_matches('/');
        if dir.is_empty() {
            return self.resolve(filename);
        }
        self.resolve(&format!("{}/{}", dir, filename))
    }
}

/// Join a directory and a file name with exactly one `/` between them.
pub fn join_key(dir: &str, filename: &str) -> String {
    let dir = dir.trim_matches('/');
    let filename = filename.trim_start_matches('/');
    if dir.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", dir, filename)
    }
}

/// Reject keys that are empty, absolute or contain parent-directory segments.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty storage key".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "storage key must be relative: {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "storage key contains '..': {}",
            key
        )));
    }
    Ok(())
}
