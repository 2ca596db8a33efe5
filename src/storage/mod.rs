//! Object storage the manifest is published to.
//!
//! [`ObjectStore`] covers the three calls publishing needs: overwrite an
//! object, make it public-read, and read it back. [`S3Store`] talks to S3;
//! Tests use an in-process `MemoryStore`.

#[cfg(test)]
mod memory;
mod s3;

#[cfg(test)]
pub use memory::{MemoryStore, StoredObject};
pub use s3::S3Store;

use async_trait::async_trait;

/// Failure reported by a store backend.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` to `key`, replacing whatever was there.
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str)
    -> Result<(), StoreError>;

    /// Grants anonymous read access to `key`.
    async fn set_public_read(&self, key: &str) -> Result<(), StoreError>;

    /// Reads the full content of `key`.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Bucket name, used in log lines and error messages.
    fn bucket(&self) -> &str;
}
