//! Request context extraction for tracking calls
//!
//! Client IP comes from proxy forwarding headers with a fixed placeholder
//! fallback. Geo fields are read only from infrastructure-injected edge
//! headers: anything the client itself could set is ignored. Every free-text
//! field is truncated to a per-field limit before persistence.

use axum::http::HeaderMap;

/// Per-field character limits applied before persistence.
pub mod limits {
    pub const REFERRER: usize = 2048;
    pub const USER_AGENT: usize = 512;
    pub const LABEL: usize = 256;
    pub const UTM: usize = 256;
    pub const BLOCK_TYPE: usize = 64;
    pub const TARGET_URL: usize = 2048;
    pub const SESSION_ID: usize = 128;
    pub const GEO: usize = 128;
}

/// A header value as `&str`, `None` when absent or not valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extract the client IP: first hop of `x-forwarded-for`, then `x-real-ip`,
/// then a fixed placeholder. Never fails and never blocks.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(xff) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = xff.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    "unknown".to_string()
}

/// Country, region and city from trusted edge headers. `cf-ipcountry` is the
/// country fallback when the platform headers are absent.
pub fn geo_fields(headers: &HeaderMap) -> (Option<String>, Option<String>, Option<String>) {
    let country = header_str(headers, "x-vercel-ip-country")
        .or_else(|| header_str(headers, "cf-ipcountry"));
    let region = header_str(headers, "x-vercel-ip-country-region");
    let city = header_str(headers, "x-vercel-ip-city");

    (
        truncate(country, limits::GEO),
        truncate(region, limits::GEO),
        truncate(city, limits::GEO),
    )
}

/// Truncate a free-text field to `max` characters. Absent and empty values
/// collapse to `None`; values at or under the limit pass through unchanged.
pub fn truncate(value: Option<&str>, max: usize) -> Option<String> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    Some(value.chars().take(max).collect())
}
