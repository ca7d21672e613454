use axum::Json;

use crate::models::HealthResponse;

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_time: env!("FILE_EXCHANGE_BUILD_TIME").to_string(),
    })
}
