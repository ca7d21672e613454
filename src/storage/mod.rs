//! Object store abstraction / 对象存储抽象
//!
//! Only primitives (bucket check, put, head, list, delete, presign).
//! Tenant layout and metadata shaping live in the service layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod memory;
pub mod s3_store;

pub use memory::MemoryStore;
pub use s3_store::S3Store;

use crate::config::{StorageBackend, StorageConfig};

/// Storage layer error / 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("object store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One stored object as reported by the store / 对象信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Create the bucket if it does not exist. "Already exists" is success.
    async fn ensure_bucket(&self) -> StoreResult<()>;

    /// Store an object, replacing any existing object under the same key
    async fn put_object(&self, key: &str, content: &[u8], content_type: &str) -> StoreResult<()>;

    /// Stat one exact key. A missing object is `StoreError::NotFound`.
    async fn head_object(&self, key: &str) -> StoreResult<ObjectInfo>;

    /// Recursive listing of every object under `prefix`
    async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>>;

    /// Delete one key. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> StoreResult<()>;

    /// Presigned GET url for one key. Expiry limits are the signer's.
    async fn presign_get(&self, key: &str, expires_in_secs: i64) -> StoreResult<String>;
}

/// Build the configured store / 根据配置创建存储
pub fn create_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::S3 => Arc::new(S3Store::new(config.clone())?),
        StorageBackend::Memory => Arc::new(MemoryStore::new(&config.bucket)),
    };
    tracing::info!("Object store ready: backend={}, bucket={}", store.name(), config.bucket);
    Ok(store)
}
