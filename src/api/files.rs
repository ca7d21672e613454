use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};

use super::{ApiError, ApiKey};
use crate::models::{FileMetadata, FileUpload, ShareRequest, ShareResponse};
use crate::state::AppState;

/// Keep the status axum assigns (400 malformed, 413 over the body limit)
fn multipart_error(e: MultipartError) -> ApiError {
    let status = e.status();
    tracing::warn!("Upload rejected: status={}, error={}", status, e.body_text());
    ApiError::Rejected(status, e.body_text())
}

/// Pull the `file` part out of the form / 解析multipart中的file字段
async fn read_file_field(multipart: &mut Multipart) -> Result<FileUpload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field.bytes().await.map_err(multipart_error)?;

        return Ok(FileUpload {
            filename,
            content_type,
            data,
        });
    }

    Err(ApiError::BadRequest("Required part 'file' is not present".to_string()))
}

/// POST /api/v1/files/upload
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ApiKey(api_key): ApiKey,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileMetadata>), ApiError> {
    let upload = read_file_field(&mut multipart).await?;
    tracing::info!(
        "Upload request: user={}, filename={}, size={} bytes",
        api_key,
        upload.filename,
        upload.size()
    );

    if upload.is_empty() {
        tracing::warn!("Upload rejected: empty file for user={}", api_key);
        return Err(ApiError::BadRequest("File is empty".to_string()));
    }
    if upload.filename.is_empty() {
        tracing::warn!("Upload rejected: missing filename for user={}", api_key);
        return Err(ApiError::BadRequest("File name is missing".to_string()));
    }

    let metadata = state.files.upload(&api_key, upload).await?;
    tracing::info!(
        "Upload success: user={}, fileId={}, size={} bytes",
        api_key,
        metadata.id,
        metadata.size
    );
    Ok((StatusCode::CREATED, Json(metadata)))
}

/// GET /api/v1/files
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ApiKey(api_key): ApiKey,
) -> Result<Json<Vec<FileMetadata>>, ApiError> {
    let files = state.files.list_files(&api_key).await?;
    tracing::info!("List files: user={}, count={}", api_key, files.len());
    Ok(Json(files))
}

/// GET /api/v1/files/:file_id
pub async fn get_file_info(
    State(state): State<Arc<AppState>>,
    ApiKey(api_key): ApiKey,
    Path(file_id): Path<String>,
) -> Result<Json<FileMetadata>, ApiError> {
    let meta = state.files.get_metadata(&api_key, &file_id).await?;
    tracing::info!(
        "Get file info: user={}, fileId={}, size={} bytes",
        api_key,
        file_id,
        meta.size
    );
    Ok(Json(meta))
}

/// POST /api/v1/files/:file_id/share
///
/// Body is optional; no body, `{}` and `{"expiresIn": null}` all mean 3600s.
pub async fn share_file(
    State(state): State<Arc<AppState>>,
    ApiKey(api_key): ApiKey,
    Path(file_id): Path<String>,
    body: Bytes,
) -> Result<Json<ShareResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ShareRequest::default()
    } else {
        serde_json::from_slice::<ShareRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid share request: {}", e)))?
    };
    let expires_in = request.expires_in_or_default();

    tracing::info!(
        "Create presigned URL: user={}, fileId={}, expiresIn={}s",
        api_key,
        file_id,
        expires_in
    );

    let url = state
        .files
        .create_presigned_url(&api_key, &file_id, expires_in)
        .await?;

    Ok(Json(ShareResponse {
        url: url.to_string(),
        expires_in,
    }))
}

/// DELETE /api/v1/files/:file_id
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    ApiKey(api_key): ApiKey,
    Path(file_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    tracing::info!("Delete file: user={}, fileId={}", api_key, file_id);
    state.files.delete(&api_key, &file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
