//! Object store access
//!
//! The pipeline only needs two calls from the store: the bucket's tag set
//! and an object's body. [`ObjectSource`] is that contract; [`S3Storage`]
//! fulfils it with the AWS SDK.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    Client,
};
use s3_to_loggly_common::{Result, TranscodeError};
use tracing::{debug, info, instrument};

use crate::endpoint::BucketTags;

pub mod config;

pub use config::StorageConfig;

/// S3 error code for a bucket that has never been tagged
const NO_SUCH_TAG_SET: &str = "NoSuchTagSet";

/// Read access to bucket metadata and object bodies
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Tags of `bucket`; an untagged bucket yields an empty set
    async fn bucket_tags(&self, bucket: &str) -> Result<BucketTags>;

    /// Entire body of `bucket/key`
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        debug!("Initializing storage client (endpoint override: {:?})", config.endpoint);

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some((access_key, secret_key)) = config.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "s3-to-loggly",
            ));
        }

        let shared_config = loader.load().await;

        let mut s3_config_builder =
            aws_sdk_s3::config::Builder::from(&shared_config).force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!(
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Storage client initialized"
        );

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectSource for S3Storage {
    #[instrument(skip(self))]
    async fn bucket_tags(&self, bucket: &str) -> Result<BucketTags> {
        debug!("Reading tags of bucket {}", bucket);

        match self.client.get_bucket_tagging().bucket(bucket).send().await {
            Ok(output) => {
                let tags: BucketTags = output
                    .tag_set()
                    .iter()
                    .map(|tag| (tag.key(), tag.value()))
                    .collect();
                debug!("Bucket {} has {} tags", bucket, tags.len());
                Ok(tags)
            },
            Err(err)
                if err
                    .as_service_error()
                    .and_then(|e| e.code())
                    .is_some_and(|code| code == NO_SUCH_TAG_SET) =>
            {
                debug!("Bucket {} has no tag set", bucket);
                Ok(BucketTags::new())
            },
            Err(err) => Err(TranscodeError::dependency(format!(
                "Failed to read tags of bucket {}: {}",
                bucket,
                DisplayErrorContext(&err)
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!("Downloading from s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                TranscodeError::dependency(format!(
                    "Failed to download s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&err)
                ))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|err| {
                TranscodeError::dependency(format!(
                    "Failed to read body of s3://{}/{}: {}",
                    bucket, key, err
                ))
            })?
            .into_bytes()
            .to_vec();

        debug!("Downloaded {} bytes from s3://{}/{}", data.len(), bucket, key);

        Ok(data)
    }
}
