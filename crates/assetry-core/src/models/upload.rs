//! Uploaded file handle as received from the host.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file the host has already written to a temporary location.
///
/// `name` is the client-supplied file name used to seed unique naming; `path` is where
/// the bytes currently live on local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A reference to an already-stored asset, as handed back by the host on reads.
///
/// `path` may hold a public URL, a path under the asset path or a bare store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAssetRef {
    pub path: String,
}

impl StoredAssetRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
