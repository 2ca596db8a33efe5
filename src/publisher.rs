//! Publish and verify steps of the manifest pipeline.
//!
//! The pipeline is strictly linear: build, upload, set public-read, read back,
//! compare. Any failure stops it; nothing is retried or rolled back.

use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::discovery::build_manifest;
use crate::error::{PublisherError, Result};
use crate::manifest::Manifest;
use crate::storage::ObjectStore;

pub const MANIFEST_CONTENT_TYPE: &str = "application/json";

/// Result of a pipeline run that got as far as verification.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    pub bucket: String,
    pub key: String,
    pub entries: usize,
    pub verified: bool,
}

impl PublishReport {
    /// Turns an unverified report into a [`PublisherError::VerificationMismatch`].
    pub fn into_result(self) -> Result<Self> {
        if self.verified {
            Ok(self)
        } else {
            Err(PublisherError::VerificationMismatch {
                bucket: self.bucket,
                key: self.key,
            })
        }
    }
}

/// Uploads the manifest to `key`, replacing any existing object, then makes
/// it public-read.
pub async fn publish_manifest<S>(store: &S, manifest: &Manifest, key: &str) -> Result<()>
where
    S: ObjectStore + ?Sized,
{
    let publish_error = |reason: String| PublisherError::Publish {
        bucket: store.bucket().to_string(),
        key: key.to_string(),
        reason,
    };

    let body = manifest.to_json_pretty()?.into_bytes();

    store
        .put_object(key, body, MANIFEST_CONTENT_TYPE)
        .await
        .map_err(|e| publish_error(e.to_string()))?;

    store
        .set_public_read(key)
        .await
        .map_err(|e| publish_error(format!("public-read ACL: {}", e)))?;

    info!(
        bucket = store.bucket(),
        key = key,
        entries = manifest.len(),
        "Published manifest"
    );

    Ok(())
}

/// Reads `key` back and reports whether it structurally equals `expected`.
///
/// Content that is not UTF-8 or not JSON counts as a mismatch. Only a failed
/// fetch is an error.
pub async fn verify_publish<S>(store: &S, expected: &Manifest, key: &str) -> Result<bool>
where
    S: ObjectStore + ?Sized,
{
    let body = store
        .get_object(key)
        .await
        .map_err(|e| PublisherError::Fetch {
            bucket: store.bucket().to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    let content = match String::from_utf8(body) {
        Ok(content) => content,
        Err(e) => {
            warn!(key = key, error = %e, "Remote manifest is not valid UTF-8");
            return Ok(false);
        }
    };

    let remote: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!(key = key, error = %e, "Remote manifest is not valid JSON");
            return Ok(false);
        }
    };

    let verified = expected.matches(&remote);
    if !verified {
        warn!(bucket = store.bucket(), key = key, "Remote manifest differs from local data");
    }

    Ok(verified)
}

/// Runs build, publish and verify in order. The manifest is fully built
/// before anything is sent, so a bad config never reaches the bucket.
pub async fn run_pipeline<S>(
    store: &S,
    base_dir: &Path,
    key: &str,
    sort: bool,
) -> Result<PublishReport>
where
    S: ObjectStore + ?Sized,
{
    let mut manifest = build_manifest(base_dir)?;
    if sort {
        manifest.sort_by_slug();
    }

    publish_manifest(store, &manifest, key).await?;
    let verified = verify_publish(store, &manifest, key).await?;

    Ok(PublishReport {
        bucket: store.bucket().to_string(),
        key: key.to_string(),
        entries: manifest.len(),
        verified,
    })
}
