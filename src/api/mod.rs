pub mod extract;
pub mod files;
pub mod server;
pub mod stats;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::ServiceError;
use crate::state::AppState;

pub use extract::ApiKey;

/// HTTP-facing error / 接口错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    /// Request body rejected by the framework with its own status (e.g. 413)
    #[error("{1}")]
    Rejected(StatusCode, String),
    #[error("file not found")]
    NotFound,
    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ApiErrBody {
    error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound => ApiError::NotFound,
            // details already logged by the service
            ServiceError::StoreFailure(_) => ApiError::Internal,
        }
    }
}

/// Build the HTTP router / 创建路由
pub fn create_router(state: Arc<AppState>, max_upload_size: usize) -> Router {
    let v1 = Router::new()
        .route("/files/upload", post(files::upload_file))
        .route("/files", get(files::list_files))
        .route("/files/:file_id", get(files::get_file_info).delete(files::delete_file))
        .route("/files/:file_id/share", post(files::share_file))
        .route("/stats", get(stats::get_stats));

    Router::new()
        .route("/api/health", get(server::health_check))
        .nest("/api/v1", v1)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
