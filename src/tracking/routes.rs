use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::storage::Storage;

use super::handlers::{health_check, record_link_click, record_page_view, TrackingState};

pub fn create_tracking_router(storage: Arc<dyn Storage>) -> Router {
    let state = Arc::new(TrackingState { storage });

    // Tracking calls come from arbitrary public profile pages
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/track/pageview", post(record_page_view))
        .route("/track/click", post(record_link_click))
        .layer(cors)
        .with_state(state)
}
