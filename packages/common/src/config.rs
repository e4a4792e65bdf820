use std::path::PathBuf;

use serde::Deserialize;

/// Which object-store backend to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible object storage (AWS, MinIO, R2, ...).
    S3,
    /// Local directory store for development and tests.
    Filesystem,
}

/// Object storage configuration.
///
/// The S3 fields are only consulted when `backend = "s3"`, and `root` only
/// when `backend = "filesystem"`.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Public base URL from which stored objects are reachable. Object URLs
    /// are `{public_base_url}/{key}`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    /// Endpoint override for S3-compatible services. Empty means AWS.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,

    /// Root directory for the filesystem backend. Default: "./data/objects".
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Filesystem
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:9000/media".into()
}
fn default_root() -> PathBuf {
    PathBuf::from("./data/objects")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            public_base_url: default_public_base_url(),
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            root: default_root(),
        }
    }
}
