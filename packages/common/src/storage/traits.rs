use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed object storage.
///
/// Keys are relative paths like `uploads/{id}.png`. Implementations must be
/// safe to call concurrently from many requests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key` with the given content type and return the
    /// public URL of the stored object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str)
    -> Result<String, StorageError>;

    /// Remove the object under `key`.
    ///
    /// This is an "ensure absent" operation: deleting a key that does not
    /// exist succeeds, so retries and out-of-band removals are harmless.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// The public URL an object under `key` would be served from.
    ///
    /// Pure string construction; performs no I/O and never fails.
    fn public_url(&self, key: &str) -> String;
}
