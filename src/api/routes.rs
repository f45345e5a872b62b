use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::DatabaseBackend;
use crate::storage::Storage;

use super::handlers::{global_overview, health_check, profile_analytics, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>, backend: DatabaseBackend) -> Router {
    let state = Arc::new(AppState { storage, backend });

    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/profiles/{profile_id}/analytics",
            get(profile_analytics),
        )
        .route("/api/analytics/overview", get(global_overview))
        .with_state(state)
}
