//! Dashboard API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::reports::{self, GlobalDashboard, ProfileDashboard};
use crate::analytics::TimeRange;
use crate::config::DatabaseBackend;
use crate::storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub backend: DatabaseBackend,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Deserialize)]
pub struct GlobalQuery {
    pub range: Option<String>,

    /// Profile rows to return (default: 15, max: 50)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    15
}

fn resolve_range(range: Option<&str>) -> Result<TimeRange, (StatusCode, Json<ErrorResponse>)> {
    match range {
        None => Ok(TimeRange::default()),
        Some(token) => TimeRange::parse(token).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid range".to_string(),
                }),
            )
        }),
    }
}

/// Full dashboard payload for one profile
pub async fn profile_analytics(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ProfileDashboard>, (StatusCode, Json<ErrorResponse>)> {
    let range = resolve_range(query.range.as_deref())?;

    match reports::profile_dashboard(state.storage.as_ref(), &profile_id, range).await {
        Ok(dashboard) => Ok(Json(dashboard)),
        Err(e) => {
            tracing::error!("Failed to load profile analytics: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to load analytics".to_string(),
                }),
            ))
        }
    }
}

/// Installation-wide dashboard payload
pub async fn global_overview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GlobalQuery>,
) -> Result<Json<GlobalDashboard>, (StatusCode, Json<ErrorResponse>)> {
    let range = resolve_range(query.range.as_deref())?;
    let limit = query.limit.min(50).max(1);

    match reports::global_dashboard(state.storage.as_ref(), range, limit).await {
        Ok(dashboard) => Ok(Json(dashboard)),
        Err(e) => {
            tracing::error!("Failed to load global overview: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to load analytics".to_string(),
                }),
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.backend.as_str().to_string(),
    })
}
