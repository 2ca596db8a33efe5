use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use tracing::{debug, trace};

use super::{ObjectStore, StoreError};
use crate::config::{PublishConfig, create_s3_client};

/// S3 bucket handle.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client from `config` using the ambient credential chain.
    pub async fn from_config(config: &PublishConfig) -> Self {
        let client = create_s3_client(config).await;
        Self::new(client, config.bucket.clone())
    }
}

fn store_error<E>(err: E) -> StoreError
where
    E: std::error::Error,
{
    DisplayErrorContext(err).to_string().into()
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key = key, size = body.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(store_error)?;

        Ok(())
    }

    async fn set_public_read(&self, key: &str) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key = key, "Setting public-read ACL");

        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(store_error)?;

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        debug!(bucket = %self.bucket, key = key, "Downloading object");

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(store_error)?;

        let bytes = result.body.collect().await.map_err(store_error)?;
        let data = bytes.into_bytes().to_vec();
        trace!(bucket = %self.bucket, key = key, size = data.len(), "Downloaded object");

        Ok(data)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
