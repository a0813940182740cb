use crate::domain::PhotoContentStore;
use crate::s3::S3Config;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Photo store backed by an S3 bucket
pub struct S3PhotoStore {
    store: Arc<dyn ObjectStore>,
    config: S3Config,
    upload_timeout: Duration,
}

impl S3PhotoStore {
    pub fn new(config: S3Config, upload_timeout: Duration) -> Result<Self> {
        info!(bucket = %config.bucket, region = %config.region, "initializing s3 photo store");

        let mut builder = AmazonS3Builder::new()
            .with_region(&config.region)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().context("failed to build s3 client")?;

        Ok(Self {
            store: Arc::new(store),
            config,
            upload_timeout,
        })
    }

    /// Store that keeps objects in process memory, addressed with the same URLs as S3
    pub fn in_memory(config: S3Config) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            config,
            upload_timeout: Duration::from_secs(5),
        }
    }

    /// Read an object back; used to verify uploads
    #[cfg(any(test, feature = "testing"))]
    pub async fn download(&self, key: &str) -> Result<Bytes> {
        let object = self
            .store
            .get(&Path::from(key))
            .await
            .context("failed to get object")?;
        object.bytes().await.context("failed to read object content")
    }
}

#[async_trait]
impl PhotoContentStore for S3PhotoStore {
    #[instrument(skip(self, content), fields(bucket = %self.config.bucket, size = content.len()))]
    async fn upload(&self, key: &str, content: Bytes) -> Result<()> {
        let path = Path::from(key);

        tokio::time::timeout(
            self.upload_timeout,
            self.store.put(&path, PutPayload::from(content)),
        )
        .await
        .map_err(|_| anyhow!("upload of {} timed out after {:?}", key, self.upload_timeout))?
        .context("failed to upload object")?;

        debug!(key = %key, "photo uploaded");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.config.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.config.bucket,
                key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.config.bucket, self.config.region, key
            ),
        }
    }
}
