use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presigned link lifetime when the caller gives none / 默认分享有效期（秒）
pub const DEFAULT_SHARE_EXPIRES_IN: i64 = 3600;

/// One stored file as seen by a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Upload payload handed from the HTTP layer to the service
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: bytes::Bytes,
}

impl FileUpload {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Signed, unvalidated: the store's signer is the only bound
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl ShareRequest {
    pub fn expires_in_or_default(&self) -> i64 {
        self.expires_in.unwrap_or(DEFAULT_SHARE_EXPIRES_IN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub url: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub files_count: u32,
    pub total_size: u64,
}

impl StatsResponse {
    pub fn from_files(files: &[FileMetadata]) -> Self {
        Self {
            files_count: u32::try_from(files.len()).unwrap_or(u32::MAX),
            total_size: files.iter().map(|f| f.size).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build_time: String,
}
