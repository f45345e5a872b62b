use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Page view tracking payload. Every field is optional so the bot
/// short-circuit can run before required-field validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewPayload {
    pub profile_id: Option<String>,
    pub session_id: Option<String>,
    pub referrer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

/// Link click tracking payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkClickPayload {
    pub profile_id: Option<String>,
    pub block_id: Option<String>,
    pub block_type: Option<String>,
    pub target_url: Option<String>,
    pub label: Option<String>,
}

/// Sanitized page view, ready for insertion as an immutable fact row.
#[derive(Debug, Clone)]
pub struct NewPageView {
    pub profile_id: String,
    pub visitor_hash: String,
    pub session_id: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: &'static str,
    pub browser_name: &'static str,
    pub os_name: &'static str,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub created_at: i64,
}

/// Sanitized link click, ready for insertion as an immutable fact row.
#[derive(Debug, Clone)]
pub struct NewLinkClick {
    pub profile_id: String,
    pub block_id: String,
    pub visitor_hash: String,
    pub block_type: String,
    pub target_url: Option<String>,
    pub label: Option<String>,
    pub device_type: &'static str,
    pub country: Option<String>,
    pub created_at: i64,
}

/// Stored page view row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PageViewRow {
    pub id: i64,
    pub profile_id: String,
    pub visitor_hash: String,
    pub session_id: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: String,
    pub browser_name: String,
    pub os_name: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub created_at: i64,
}

/// Stored link click row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LinkClickRow {
    pub id: i64,
    pub profile_id: String,
    pub block_id: String,
    pub visitor_hash: String,
    pub block_type: String,
    pub target_url: Option<String>,
    pub label: Option<String>,
    pub device_type: String,
    pub country: Option<String>,
    pub created_at: i64,
}
