//! Listing content read from an S3 bucket

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

use crate::domain::listing::{Asin, ContentStore, ListingContent};
use crate::domain::DomainError;

/// Location of generated listings in S3
#[derive(Debug, Clone)]
pub struct S3ContentConfig {
    pub bucket: String,
    pub prefix: String,
    pub region: Option<String>,
}

impl S3ContentConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: String::new(),
            region: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Object key for an ASIN
    pub fn key_for(&self, asin: &Asin) -> String {
        format!("{}{}.json", self.prefix, asin.as_str())
    }
}

/// Reads `s3://{bucket}/{prefix}{asin}.json`
pub struct S3ContentStore {
    config: S3ContentConfig,
    client: S3Client,
}

impl Debug for S3ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ContentStore")
            .field("config", &self.config)
            .finish()
    }
}

impl S3ContentStore {
    /// Build a client from the default AWS credential chain
    pub async fn new(config: S3ContentConfig) -> Self {
        let aws_config = if let Some(region) = &config.region {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region.clone()))
                .load()
                .await
        } else {
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
        };

        Self::with_config(config, &aws_config)
    }

    /// Create with an existing AWS SDK config
    pub fn with_config(config: S3ContentConfig, aws_config: &aws_config::SdkConfig) -> Self {
        Self {
            config,
            client: S3Client::new(aws_config),
        }
    }
}

#[async_trait]
impl ContentStore for S3ContentStore {
    async fn fetch(&self, asin: &Asin) -> Result<Option<ListingContent>, DomainError> {
        let key = self.config.key_for(asin);
        debug!(asin = %asin, bucket = %self.config.bucket, key = %key, "Reading listing content");

        let output = match self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(DomainError::storage(format!(
                    "Failed to read s3://{}/{}: {}",
                    self.config.bucket, key, e
                )));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read object body: {}", e)))?
            .into_bytes();

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            DomainError::storage(format!(
                "Invalid listing content in s3://{}/{}: {}",
                self.config.bucket, key, e
            ))
        })
    }

    fn store_name(&self) -> &'static str {
        "s3"
    }
}
