//! Health check and platform stats handlers

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, error_codes, ok};
use crate::authz::Actor;
use crate::stats::BaseInfo;

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// Build revision
    #[schema(example = "a1b2c3d")]
    pub version: String,
    /// `postgres` or `memory`
    #[schema(example = "postgres")]
    pub store: String,
}

/// Health check endpoint
///
/// Pings PostgreSQL when configured. Failure details are logged, never
/// returned.
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, version, store}}
/// - Unhealthy: 503 Service Unavailable + {code: 5000, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store = match &state.pg_db {
        Some(db) => {
            if let Err(e) = db.health_check().await {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse {
                        code: error_codes::INTERNAL_ERROR,
                        msg: "unavailable".to_string(),
                        data: None,
                    }),
                );
            }
            "postgres"
        }
        None => "memory",
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: Utc::now().timestamp_millis(),
            version: env!("GIT_HASH").to_string(),
            store: store.to_string(),
        })),
    )
}

/// Platform statistics
///
/// GET /api/base-info/
#[utoipa::path(
    get,
    path = "/api/base-info/",
    responses(
        (status = 200, description = "Platform totals", body = ApiResponse<BaseInfo>)
    ),
    tag = "System"
)]
pub async fn base_info(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<BaseInfo> {
    ok(state.stats.base_info(&actor).await?)
}
