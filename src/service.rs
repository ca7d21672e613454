//! Tenant file service / 租户文件服务
//!
//! Every tenant owns the key prefix `files/<percent-encoded api_key>/`. Isolation is purely
//! by key construction; nothing here checks who the key belongs to.

use chrono::Utc;
use std::sync::Arc;
use url::Url;

use crate::models::{FileMetadata, FileUpload, StatsResponse};
use crate::storage::{ObjectStore, StoreError};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("file not found")]
    NotFound,
    #[error("object store failure: {0}")]
    StoreFailure(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ServiceError::NotFound,
            StoreError::Backend(msg) => ServiceError::StoreFailure(msg),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Key prefix owned by one tenant.
///
/// The key is percent-encoded so it always occupies exactly one path
/// segment: `alice/sub` must not land inside `alice`'s prefix.
pub fn tenant_prefix(api_key: &str) -> String {
    format!("files/{}/", urlencoding::encode(api_key))
}

/// Full object key for a tenant file
pub fn object_key(api_key: &str, file_id: &str) -> String {
    format!("{}{}", tenant_prefix(api_key), file_id)
}

#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn ObjectStore>,
}

impl FileService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// All files under the tenant prefix, recursively. All-or-nothing.
    pub async fn list_files(&self, api_key: &str) -> ServiceResult<Vec<FileMetadata>> {
        let prefix = tenant_prefix(api_key);
        let objects = self.store.list_objects(&prefix).await.map_err(|e| {
            tracing::error!("Store list failed: user={}, error={}", api_key, e);
            ServiceError::StoreFailure(e.to_string())
        })?;

        let files: Vec<FileMetadata> = objects
            .into_iter()
            .map(|obj| FileMetadata {
                id: obj.key.strip_prefix(&prefix).unwrap_or(&obj.key).to_string(),
                // full key, unlike every other operation
                filename: obj.key,
                size: obj.size,
                created_at: obj.last_modified,
            })
            .collect();

        tracing::info!("Store list: user={}, objects={}", api_key, files.len());
        Ok(files)
    }

    /// Store a file under its original name, overwriting any previous one
    pub async fn upload(&self, api_key: &str, upload: FileUpload) -> ServiceResult<FileMetadata> {
        let key = object_key(api_key, &upload.filename);
        tracing::info!("Store upload: user={}, object={}", api_key, key);

        let content_type = upload
            .content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .or_else(|| {
                mime_guess::from_path(&upload.filename)
                    .first()
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let stored = async {
            self.store.ensure_bucket().await?;
            self.store.put_object(&key, &upload.data, &content_type).await
        }
        .await;

        if let Err(e) = stored {
            tracing::error!("Store upload failed: user={}, object={}, error={}", api_key, key, e);
            return Err(ServiceError::StoreFailure(e.to_string()));
        }

        Ok(FileMetadata {
            id: upload.filename.clone(),
            size: upload.size(),
            filename: upload.filename,
            created_at: Utc::now(),
        })
    }

    /// Stat one file. Missing object is `ServiceError::NotFound`.
    pub async fn get_metadata(&self, api_key: &str, file_id: &str) -> ServiceResult<FileMetadata> {
        let key = object_key(api_key, file_id);
        match self.store.head_object(&key).await {
            Ok(obj) => Ok(FileMetadata {
                id: file_id.to_string(),
                filename: obj.key,
                size: obj.size,
                created_at: obj.last_modified,
            }),
            Err(StoreError::NotFound(_)) => {
                tracing::warn!("Store stat: object not found, user={}, fileId={}", api_key, file_id);
                Err(ServiceError::NotFound)
            }
            Err(e) => {
                tracing::error!("Store stat failed: user={}, fileId={}, error={}", api_key, file_id, e);
                Err(e.into())
            }
        }
    }

    /// Unconditional delete, no existence check
    pub async fn delete(&self, api_key: &str, file_id: &str) -> ServiceResult<()> {
        let key = object_key(api_key, file_id);
        tracing::info!("Store delete: user={}, object={}", api_key, key);
        self.store.delete_object(&key).await.map_err(|e| {
            tracing::error!("Store delete failed: user={}, object={}, error={}", api_key, key, e);
            ServiceError::StoreFailure(e.to_string())
        })
    }

    /// GET-only presigned link. `expires_in_secs` is not range checked here;
    /// zero, negative and oversized values go straight to the signer.
    pub async fn create_presigned_url(
        &self,
        api_key: &str,
        file_id: &str,
        expires_in_secs: i64,
    ) -> ServiceResult<Url> {
        let key = object_key(api_key, file_id);
        tracing::info!(
            "Store presign: user={}, object={}, expiresIn={}s",
            api_key,
            key,
            expires_in_secs
        );

        let presigned = self
            .store
            .presign_get(&key, expires_in_secs)
            .await
            .map_err(|e| e.to_string())
            .and_then(|raw| Url::parse(&raw).map_err(|e| format!("invalid presigned url: {}", e)));

        presigned.map_err(|e| {
            tracing::error!("Store presign failed: user={}, object={}, error={}", api_key, key, e);
            ServiceError::StoreFailure(e)
        })
    }

    /// File count and byte total from one fresh listing
    pub async fn stats(&self, api_key: &str) -> ServiceResult<StatsResponse> {
        let files = self.list_files(api_key).await?;
        Ok(StatsResponse::from_files(&files))
    }
}
