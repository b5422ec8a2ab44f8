//! S3-compatible backend over the `rust-s3` crate. Works against AWS S3,
//! MinIO, R2, and other providers that speak the S3 API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;

use crate::config::S3StorageConfig;

use super::object_store::{ObjectMeta, ObjectStore, StoredObject};

pub struct S3ObjectStore {
    bucket: Bucket,
}

impl S3ObjectStore {
    pub fn new(config: &S3StorageConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        // Falls back to the environment/instance-profile chain when no
        // static keys are configured.
        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .context("failed to resolve S3 credentials")?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .context("failed to configure S3 bucket")?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<StoredObject>> {
        let (page, _status) = self
            .bucket
            .list_page(prefix.to_string(), None, None, None, Some(max_keys))
            .await?;

        Ok(page
            .contents
            .into_iter()
            .map(|object| StoredObject {
                last_modified: parse_timestamp(&object.last_modified).unwrap_or_else(Utc::now),
                key: object.key,
                size: object.size,
            })
            .collect())
    }

    async fn put_object(&self, key: &str, content_type: &str, data: &[u8]) -> Result<()> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.bucket.delete_object(key).await?;
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectMeta>> {
        match self.bucket.head_object(key).await {
            Ok((head, status)) if (200..300).contains(&status) => Ok(Some(ObjectMeta {
                content_length: head.content_length.unwrap_or(0).max(0) as u64,
                content_type: head.content_type,
                last_modified: head.last_modified.as_deref().and_then(parse_timestamp),
            })),
            Ok((_, 404)) => Ok(None),
            Ok((_, status)) => Err(anyhow!("unexpected status {} from head on {}", status, key)),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String> {
        Ok(self.bucket.presign_get(key, expiry_secs, None).await?)
    }
}

/// Listing entries carry RFC 3339 timestamps; head responses use the HTTP
/// date format. Accept both.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
