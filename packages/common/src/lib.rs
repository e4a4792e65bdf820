pub mod config;
pub mod storage;
pub mod transcode;

pub use config::{StorageBackend, StorageConfig};
