//! Error kinds raised while building, publishing and verifying a manifest.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublisherError {
    /// Base directory missing, not listable, or a config file that exists but cannot be read
    #[error("Filesystem error at {}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config.json that is not valid JSON, or not a JSON object
    #[error("Failed to parse config {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// Upload or ACL assignment failed
    #[error("Failed to publish s3://{bucket}/{key}: {reason}")]
    Publish {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Read-back of the published object failed
    #[error("Failed to fetch s3://{bucket}/{key}: {reason}")]
    Fetch {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Remote content does not structurally equal the local manifest
    #[error("the uploaded {key} in bucket {bucket} does not match the local data")]
    VerificationMismatch { bucket: String, key: String },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PublisherError {
    /// Process exit status: 2 for a verification mismatch, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            PublisherError::VerificationMismatch { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PublisherError>;
