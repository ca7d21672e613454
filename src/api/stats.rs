//! 用户用量统计
//! Computed on every call from a fresh listing; never cached.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::{ApiError, ApiKey};
use crate::models::StatsResponse;
use crate::state::AppState;

/// GET /api/v1/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    ApiKey(api_key): ApiKey,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.files.stats(&api_key).await?;
    tracing::info!(
        "Stats: user={}, filesCount={}, totalSize={} bytes",
        api_key,
        stats.files_count,
        stats.total_size
    );
    Ok(Json(stats))
}
