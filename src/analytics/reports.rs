//! Dashboard composition over the storage aggregation queries.
//!
//! Each facade fans its constituent queries out concurrently and merges the
//! results into one payload. A failure in any single query fails the whole
//! dashboard instead of returning partially-populated data.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use crate::analytics::range::TimeRange;
use crate::models::{BlockStat, CampaignCount, DayCount, DimensionCount, ProfileViewCount};
use crate::storage::{Dimension, Storage, StorageResult};

const BREAKDOWN_LIMIT: i64 = 20;
const CAMPAIGN_LIMIT: i64 = 20;
const BLOCK_LIMIT: i64 = 20;
const REFERRER_LIMIT: usize = 15;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_views: i64,
    pub unique_visitors: i64,
    pub total_clicks: i64,
    pub click_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDashboard {
    pub overview: Overview,
    pub views_by_day: Vec<DayCount>,
    pub clicks_by_day: Vec<DayCount>,
    pub devices: Vec<DimensionCount>,
    pub browsers: Vec<DimensionCount>,
    pub countries: Vec<DimensionCount>,
    pub referrers: Vec<DimensionCount>,
    pub campaigns: Vec<CampaignCount>,
    pub top_blocks: Vec<BlockStat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDashboard {
    pub top_profiles: Vec<ProfileViewCount>,
    pub views_by_day: Vec<DayCount>,
    pub clicks_by_day: Vec<DayCount>,
    pub countries: Vec<DimensionCount>,
    pub devices: Vec<DimensionCount>,
}

/// Click-through rate is never stored, always derived at this layer.
pub fn click_rate(views: i64, clicks: i64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    clicks as f64 / views as f64
}

/// Reduces a raw referrer string to its host: scheme stripped, everything
/// from the first `/` on dropped. Empty or absent referrers are "direct".
pub fn referrer_host(referrer: &str) -> String {
    let trimmed = referrer.trim();
    if trimmed.is_empty() {
        return "direct".to_string();
    }
    let rest = trimmed.split_once("://").map_or(trimmed, |(_, rest)| rest);
    let host = rest.find('/').map_or(rest, |idx| &rest[..idx]);
    if host.is_empty() {
        "direct".to_string()
    } else {
        host.to_string()
    }
}

fn top_referrers(raw: Vec<DimensionCount>, limit: usize) -> Vec<DimensionCount> {
    let mut hosts: HashMap<String, i64> = HashMap::new();
    for entry in raw {
        *hosts.entry(referrer_host(&entry.label)).or_insert(0) += entry.count;
    }
    let mut merged: Vec<DimensionCount> = hosts
        .into_iter()
        .map(|(label, count)| DimensionCount { label, count })
        .collect();
    merged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    merged.truncate(limit);
    merged
}

pub async fn profile_dashboard(
    storage: &dyn Storage,
    profile_id: &str,
    range: TimeRange,
) -> StorageResult<ProfileDashboard> {
    let since = range.since(Utc::now());
    let profile = Some(profile_id);

    let (
        counts,
        views_by_day,
        clicks_by_day,
        devices,
        browsers,
        countries,
        raw_referrers,
        campaigns,
        top_blocks,
    ) = tokio::try_join!(
        storage.overview(profile, since),
        storage.views_by_day(profile, since),
        storage.clicks_by_day(profile, since),
        storage.breakdown(Dimension::Device, profile, since, None),
        storage.breakdown(Dimension::Browser, profile, since, None),
        storage.breakdown(Dimension::Country, profile, since, Some(BREAKDOWN_LIMIT)),
        storage.referrer_counts(profile, since),
        storage.utm_campaigns(profile, since, CAMPAIGN_LIMIT),
        storage.top_blocks(profile_id, since, BLOCK_LIMIT),
    )?;

    Ok(ProfileDashboard {
        overview: Overview {
            total_views: counts.total_views,
            unique_visitors: counts.unique_visitors,
            total_clicks: counts.total_clicks,
            click_rate: click_rate(counts.total_views, counts.total_clicks),
        },
        views_by_day,
        clicks_by_day,
        devices,
        browsers,
        countries,
        referrers: top_referrers(raw_referrers, REFERRER_LIMIT),
        campaigns,
        top_blocks,
    })
}

pub async fn global_dashboard(
    storage: &dyn Storage,
    range: TimeRange,
    limit: i64,
) -> StorageResult<GlobalDashboard> {
    let since = range.since(Utc::now());

    let (top_profiles, views_by_day, clicks_by_day, countries, devices) = tokio::try_join!(
        storage.top_profiles(since, limit),
        storage.views_by_day(None, since),
        storage.clicks_by_day(None, since),
        storage.breakdown(Dimension::Country, None, since, Some(BREAKDOWN_LIMIT)),
        storage.breakdown(Dimension::Device, None, since, Some(BREAKDOWN_LIMIT)),
    )?;

    Ok(GlobalDashboard {
        top_profiles,
        views_by_day,
        clicks_by_day,
        countries,
        devices,
    })
}
