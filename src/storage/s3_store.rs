//! S3 object store over rust-s3
//!
//! - 只提供原语（put, head, list, delete, presign）
//! - 非2xx状态码由本层判定（未启用 fail-on-err）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::{BucketConfiguration, Region};

use super::{ObjectInfo, ObjectStore, StoreError, StoreResult};
use crate::config::StorageConfig;

/// S3-compatible store bound to one bucket
pub struct S3Store {
    config: StorageConfig,
    bucket: Box<Bucket>,
}

impl S3Store {
    pub fn new(config: StorageConfig) -> anyhow::Result<Self> {
        let bucket = Self::create_bucket_handle(&config)?;
        Ok(Self { config, bucket })
    }

    fn credentials(config: &StorageConfig) -> anyhow::Result<Credentials> {
        Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Failed to build S3 credentials: {}", e))
    }

    fn region(config: &StorageConfig) -> Region {
        let endpoint = if config.endpoint.is_empty() {
            format!("https://s3.{}.amazonaws.com", config.region)
        } else {
            config.endpoint.clone()
        };
        Region::Custom {
            region: config.region.clone(),
            endpoint,
        }
    }

    fn create_bucket_handle(config: &StorageConfig) -> anyhow::Result<Box<Bucket>> {
        let bucket = Bucket::new(&config.bucket, Self::region(config), Self::credentials(config)?)
            .map_err(|e| anyhow::anyhow!("Failed to create S3 bucket handle: {}", e))?;

        Ok(if config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }

    async fn create_bucket(&self) -> StoreResult<u16> {
        let credentials = Self::credentials(&self.config).map_err(|e| backend(&e))?;
        let region = Self::region(&self.config);
        let response = if self.config.force_path_style {
            Bucket::create_with_path_style(
                &self.config.bucket,
                region,
                credentials,
                BucketConfiguration::default(),
            )
            .await
        } else {
            Bucket::create(
                &self.config.bucket,
                region,
                credentials,
                BucketConfiguration::default(),
            )
            .await
        };
        response
            .map(|r| r.response_code)
            .map_err(|e| backend(&e))
    }
}

fn backend(e: &dyn std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// HEAD on the bucket itself: 2xx exists, 404 missing, anything else fails
fn classify_bucket_head(bucket: &str, code: u16) -> StoreResult<bool> {
    match code {
        code if is_success(code) => Ok(true),
        404 => Ok(false),
        code => Err(StoreError::Backend(format!(
            "head bucket {} returned status {}",
            bucket, code
        ))),
    }
}

/// CreateBucket: 409 (BucketAlreadyOwnedByYou / BucketAlreadyExists) means
/// a concurrent creator won, which is success here
fn classify_create(bucket: &str, code: u16) -> StoreResult<()> {
    match code {
        code if is_success(code) => Ok(()),
        409 => {
            tracing::debug!("S3 bucket created concurrently: {}", bucket);
            Ok(())
        }
        code => Err(StoreError::Backend(format!(
            "create bucket {} returned status {}",
            bucket, code
        ))),
    }
}

fn classify_put(key: &str, code: u16) -> StoreResult<()> {
    if is_success(code) {
        Ok(())
    } else {
        Err(StoreError::Backend(format!("put {} returned status {}", key, code)))
    }
}

fn classify_head(key: &str, code: u16) -> StoreResult<()> {
    match code {
        code if is_success(code) => Ok(()),
        404 => Err(StoreError::NotFound(key.to_string())),
        code => Err(StoreError::Backend(format!("head {} returned status {}", key, code))),
    }
}

/// Deleting a missing key is success
fn classify_delete(key: &str, code: u16) -> StoreResult<()> {
    match code {
        code if is_success(code) || code == 404 => Ok(()),
        code => Err(StoreError::Backend(format!("delete {} returned status {}", key, code))),
    }
}

/// Out-of-range values saturate so the signer rejects them
fn presign_expiry(expires_in_secs: i64) -> u32 {
    u32::try_from(expires_in_secs).unwrap_or(u32::MAX)
}

/// Parse an S3 timestamp. Listings use ISO 8601, HEAD uses the HTTP date format.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

fn timestamp_or_now(key: &str, value: Option<&str>) -> DateTime<Utc> {
    match value.and_then(parse_timestamp) {
        Some(t) => t,
        None => {
            tracing::warn!("S3 object has no usable last-modified: key={}, value={:?}", key, value);
            Utc::now()
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    async fn ensure_bucket(&self) -> StoreResult<()> {
        // "/" addresses the bucket root, i.e. HeadBucket; needs no ListAllMyBuckets
        let (_, code) = self.bucket.head_object("/").await.map_err(|e| backend(&e))?;
        if classify_bucket_head(&self.config.bucket, code)? {
            return Ok(());
        }

        tracing::info!("S3 bucket missing, creating: {}", self.config.bucket);
        let code = self.create_bucket().await?;
        classify_create(&self.config.bucket, code)
    }

    async fn put_object(&self, key: &str, content: &[u8], content_type: &str) -> StoreResult<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, content, content_type)
            .await
            .map_err(|e| backend(&e))?;

        classify_put(key, response.status_code())
    }

    async fn head_object(&self, key: &str) -> StoreResult<ObjectInfo> {
        let (head, code) = self.bucket.head_object(key).await.map_err(|e| backend(&e))?;

        classify_head(key, code)?;
        Ok(ObjectInfo {
            key: key.to_string(),
            size: head.content_length.unwrap_or(0).max(0) as u64,
            last_modified: timestamp_or_now(key, head.last_modified.as_deref()),
        })
    }

    async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>> {
        // no delimiter: recursive
        let pages = self
            .bucket
            .list(prefix.to_string(), None)
            .await
            .map_err(|e| backend(&e))?;

        let objects = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|obj| ObjectInfo {
                last_modified: timestamp_or_now(&obj.key, Some(&obj.last_modified)),
                size: obj.size as u64,
                key: obj.key,
            })
            .collect();
        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        let response = self.bucket.delete_object(key).await.map_err(|e| backend(&e))?;

        classify_delete(key, response.status_code())
    }

    async fn presign_get(&self, key: &str, expires_in_secs: i64) -> StoreResult<String> {
        self.bucket
            .presign_get(key, presign_expiry(expires_in_secs), None)
            .await
            .map_err(|e| backend(&e))
    }
}
