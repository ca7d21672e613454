//! In-process object store
//!
//! Same semantics as the S3 store (overwrite on put, idempotent delete,
//! recursive prefix listing, NoSuchBucket before the bucket exists, SigV4
//! expiry limits on presign). Used for local runs and the test suite.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{ObjectInfo, ObjectStore, StoreError, StoreResult};

/// SigV4 presigned urls live at most 7 days
const MAX_PRESIGN_EXPIRY_SECS: i64 = 7 * 24 * 3600;

struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

pub struct MemoryStore {
    bucket: String,
    bucket_created: AtomicBool,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            bucket_created: AtomicBool::new(false),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn bucket_exists(&self) -> bool {
        self.bucket_created.load(Ordering::SeqCst)
    }

    /// Raw object bytes, if present
    pub fn object_data(&self, key: &str) -> Option<Bytes> {
        self.objects.read().get(key).map(|o| o.data.clone())
    }

    pub fn object_content_type(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|o| o.content_type.clone())
    }

    fn require_bucket(&self) -> StoreResult<()> {
        if self.bucket_exists() {
            Ok(())
        } else {
            Err(StoreError::Backend(format!("NoSuchBucket: {}", self.bucket)))
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ensure_bucket(&self) -> StoreResult<()> {
        if !self.bucket_created.swap(true, Ordering::SeqCst) {
            tracing::info!("Memory bucket created: {}", self.bucket);
        }
        Ok(())
    }

    async fn put_object(&self, key: &str, content: &[u8], content_type: &str) -> StoreResult<()> {
        self.require_bucket()?;
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                data: Bytes::copy_from_slice(content),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn head_object(&self, key: &str) -> StoreResult<ObjectInfo> {
        let objects = self.objects.read();
        let obj = objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(ObjectInfo {
            key: key.to_string(),
            size: obj.data.len() as u64,
            last_modified: obj.last_modified,
        })
    }

    async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>> {
        self.require_bucket()?;
        let objects = self.objects.read();
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, obj)| ObjectInfo {
                key: key.clone(),
                size: obj.data.len() as u64,
                last_modified: obj.last_modified,
            })
            .collect())
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in_secs: i64) -> StoreResult<String> {
        if !(0..=MAX_PRESIGN_EXPIRY_SECS).contains(&expires_in_secs) {
            return Err(StoreError::Backend(format!(
                "presign expiry out of range: {}s",
                expires_in_secs
            )));
        }
        Ok(format!(
            "memory://{}/{}?expires_in={}",
            self.bucket, key, expires_in_secs
        ))
    }
}
