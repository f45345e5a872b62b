//! Event ingestion handlers
//!
//! Both endpoints parse the body only after the bot check: a bot request is
//! answered with the success shape and never touches the payload or the
//! datastore. Tracking failures are reported to the caller but carry no
//! payload details.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::request_info::{self, limits};
use crate::analytics::{hash_visitor, ua};
use crate::models::{LinkClickPayload, NewLinkClick, NewPageView, PageViewPayload};
use crate::storage::Storage;

pub struct TrackingState {
    pub storage: Arc<dyn Storage>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct TrackAccepted {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Record a page view event
pub async fn record_page_view(
    State(state): State<Arc<TrackingState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TrackAccepted>, (StatusCode, Json<ErrorResponse>)> {
    let user_agent = request_info::header_str(&headers, "user-agent").unwrap_or("");

    // Bots get the success shape and no row
    if ua::is_bot(user_agent) {
        return Ok(Json(TrackAccepted { ok: true }));
    }

    let payload: PageViewPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid body".to_string(),
                }),
            ))
        }
    };

    let profile_id = match payload.profile_id.as_deref().filter(|v| !v.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "profileId is required".to_string(),
                }),
            ))
        }
    };

    let now = Utc::now();
    let ip = request_info::client_ip(&headers);
    let (country, region, city) = request_info::geo_fields(&headers);

    let view = NewPageView {
        profile_id,
        visitor_hash: hash_visitor(&ip, now.date_naive()),
        session_id: request_info::truncate(payload.session_id.as_deref(), limits::SESSION_ID),
        referrer: request_info::truncate(payload.referrer.as_deref(), limits::REFERRER),
        user_agent: request_info::truncate(Some(user_agent), limits::USER_AGENT),
        device_type: ua::classify_device(user_agent),
        browser_name: ua::classify_browser(user_agent),
        os_name: ua::classify_os(user_agent),
        country,
        region,
        city,
        utm_source: request_info::truncate(payload.utm_source.as_deref(), limits::UTM),
        utm_medium: request_info::truncate(payload.utm_medium.as_deref(), limits::UTM),
        utm_campaign: request_info::truncate(payload.utm_campaign.as_deref(), limits::UTM),
        utm_content: request_info::truncate(payload.utm_content.as_deref(), limits::UTM),
        utm_term: request_info::truncate(payload.utm_term.as_deref(), limits::UTM),
        created_at: now.timestamp(),
    };

    match state.storage.insert_page_view(&view).await {
        Ok(()) => {
            tracing::debug!(profile_id = %view.profile_id, "recorded page view");
            Ok(Json(TrackAccepted { ok: true }))
        }
        Err(e) => {
            tracing::error!("Failed to record page view: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "tracking failed".to_string(),
                }),
            ))
        }
    }
}

/// Record a link click event
pub async fn record_link_click(
    State(state): State<Arc<TrackingState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TrackAccepted>, (StatusCode, Json<ErrorResponse>)> {
    let user_agent = request_info::header_str(&headers, "user-agent").unwrap_or("");

    if ua::is_bot(user_agent) {
        return Ok(Json(TrackAccepted { ok: true }));
    }

    let payload: LinkClickPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid body".to_string(),
                }),
            ))
        }
    };

    let profile_id = match payload.profile_id.as_deref().filter(|v| !v.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "profileId is required".to_string(),
                }),
            ))
        }
    };

    let block_id = match payload.block_id.as_deref().filter(|v| !v.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "blockId is required".to_string(),
                }),
            ))
        }
    };

    // The truncating sanitizer collapses empty to None, which doubles as the
    // required-field check here
    let block_type = match request_info::truncate(payload.block_type.as_deref(), limits::BLOCK_TYPE)
    {
        Some(block_type) => block_type,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "blockType is required".to_string(),
                }),
            ))
        }
    };

    let now = Utc::now();
    let ip = request_info::client_ip(&headers);
    let (country, _region, _city) = request_info::geo_fields(&headers);

    let click = NewLinkClick {
        profile_id,
        block_id,
        visitor_hash: hash_visitor(&ip, now.date_naive()),
        block_type,
        target_url: request_info::truncate(payload.target_url.as_deref(), limits::TARGET_URL),
        label: request_info::truncate(payload.label.as_deref(), limits::LABEL),
        device_type: ua::classify_device(user_agent),
        country,
        created_at: now.timestamp(),
    };

    match state.storage.insert_link_click(&click).await {
        Ok(()) => {
            tracing::debug!(profile_id = %click.profile_id, block_id = %click.block_id, "recorded link click");
            Ok(Json(TrackAccepted { ok: true }))
        }
        Err(e) => {
            tracing::error!("Failed to record link click: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "tracking failed".to_string(),
                }),
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
