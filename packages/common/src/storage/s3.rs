use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::debug;

use super::error::StorageError;
use super::traits::ObjectStore;
use crate::config::StorageConfig;

/// Object store backed by an S3-compatible service.
///
/// Uses path-style addressing so it works against MinIO, R2 and other
/// self-hosted endpoints as well as AWS.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base: String,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::Config("storage.bucket is not set".into()));
        }
        if config.endpoint.is_empty() {
            return Err(StorageError::Config("storage.endpoint is not set".into()));
        }

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid S3 credentials: {e}")))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(format!("invalid S3 bucket: {e}")))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, bytes, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match response.status_code() {
            200..=299 => {
                debug!(key, size = bytes.len(), "Object stored");
                Ok(self.public_url(key))
            }
            status => Err(StorageError::UnexpectedStatus { status }),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        // S3 DeleteObject answers 204 whether or not the key existed, which
        // is exactly the "ensure absent" contract. 404 from stricter
        // lookalike services counts as absent too.
        match response.status_code() {
            200..=299 | 404 => Ok(()),
            status => Err(StorageError::UnexpectedStatus { status }),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }
}
