mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use traits::ObjectStore;

use crate::config::{StorageBackend, StorageConfig};

/// Construct the object store selected by the configuration.
pub async fn init_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => Ok(Arc::new(
            filesystem::FilesystemObjectStore::new(config.root.clone(), &config.public_base_url)
                .await?,
        )),
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Ok(Arc::new(s3::S3ObjectStore::new(config)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Config(
            "built without the `object-storage` feature".into(),
        )),
    }
}
