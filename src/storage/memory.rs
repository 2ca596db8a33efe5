use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ObjectStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub public_read: bool,
}

/// In-process bucket. Failures and read-back corruption can be injected to
/// drive the publish pipeline through its error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bucket: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    put_calls: Mutex<usize>,
    fail_put: Option<String>,
    fail_acl: Option<String>,
    fail_get: Option<String>,
    read_back_override: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Seeds `key` with existing content, as if a previous run had published it.
    pub fn with_object(self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.lock_objects().insert(
            key.into(),
            StoredObject {
                body: body.into(),
                content_type: "application/json".to_string(),
                public_read: true,
            },
        );
        self
    }

    pub fn failing_put(mut self, reason: impl Into<String>) -> Self {
        self.fail_put = Some(reason.into());
        self
    }

    pub fn failing_acl(mut self, reason: impl Into<String>) -> Self {
        self.fail_acl = Some(reason.into());
        self
    }

    pub fn failing_get(mut self, reason: impl Into<String>) -> Self {
        self.fail_get = Some(reason.into());
        self
    }

    /// Makes every read return `body` regardless of what was written.
    pub fn with_read_back(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.read_back_override = Some(body.into());
        self
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.lock_objects().get(key).cloned()
    }

    /// Number of upload attempts, successful or not.
    pub fn put_calls(&self) -> usize {
        *self.put_calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_objects(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        *self.put_calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        if let Some(reason) = &self.fail_put {
            return Err(reason.clone().into());
        }

        // A fresh put resets the ACL to private, as S3 does
        self.lock_objects().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                public_read: false,
            },
        );
        Ok(())
    }

    async fn set_public_read(&self, key: &str) -> Result<(), StoreError> {
        if let Some(reason) = &self.fail_acl {
            return Err(reason.clone().into());
        }

        match self.lock_objects().get_mut(key) {
            Some(object) => {
                object.public_read = true;
                Ok(())
            }
            None => Err(format!("NoSuchKey: {}", key).into()),
        }
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        if let Some(reason) = &self.fail_get {
            return Err(reason.clone().into());
        }

        if let Some(body) = &self.read_back_override {
            return Ok(body.clone());
        }

        self.lock_objects()
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| format!("NoSuchKey: {}", key).into())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new("bucket");
        store
            .put_object("models.json", b"[]".to_vec(), "application/json")
            .await
            .unwrap();

        assert_eq!(store.get_object("models.json").await.unwrap(), b"[]".to_vec());
        assert_eq!(store.put_calls(), 1);
        assert!(!store.object("models.json").unwrap().public_read);

        store.set_public_read("models.json").await.unwrap();
        assert!(store.object("models.json").unwrap().public_read);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = MemoryStore::new("bucket");
        assert!(store.get_object("nope").await.is_err());
        assert!(store.set_public_read("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_injected_put_failure_keeps_previous_object() {
        let store = MemoryStore::new("bucket")
            .with_object("models.json", "old")
            .failing_put("AccessDenied");

        let err = store
            .put_object("models.json", b"new".to_vec(), "application/json")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "AccessDenied");
        assert_eq!(store.object("models.json").unwrap().body, b"old".to_vec());
    }
}
