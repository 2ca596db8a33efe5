//! Publish target configuration and S3 client construction.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BUCKET: &str = "3dgs-benchmark";
pub const DEFAULT_OBJECT_KEY: &str = "models.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the manifest goes and how to reach it.
///
/// Credentials are never stored here; they come from the ambient AWS provider
/// chain (environment, profile, instance metadata).
#[derive(Debug, Clone, PartialEq)]
pub struct PublishConfig {
    /// Target bucket, must already exist
    pub bucket: String,

    /// Object key the manifest is written to
    pub key: String,

    /// AWS region
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible stores
    pub endpoint: Option<String>,

    /// AWS profile name
    pub profile: Option<String>,

    /// Per-operation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            key: DEFAULT_OBJECT_KEY.to_string(),
            region: None,
            endpoint: None,
            profile: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PublishConfig {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// URL anonymous clients fetch the object from once it is public-read.
    pub fn public_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, self.key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, self.key),
        }
    }
}

/// Create an S3 client from configuration.
pub async fn create_s3_client(config: &PublishConfig) -> Client {
    use aws_config::Region;
    use aws_config::timeout::TimeoutConfig;

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(
        TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_secs))
            .build(),
    );

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    let sdk_config = loader.load().await;
    debug!(region = ?sdk_config.region(), endpoint = ?config.endpoint, "Loaded AWS config");

    let builder = aws_sdk_s3::config::Builder::from(&sdk_config);

    // Custom endpoints (MinIO, LocalStack) generally need path-style addressing
    let s3_config = if config.endpoint.is_some() {
        builder.force_path_style(true).build()
    } else {
        builder.build()
    };

    Client::from_conf(s3_config)
}
