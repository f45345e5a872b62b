//! Row types produced by the aggregation queries

use serde::Serialize;
use sqlx::FromRow;

/// Event totals for one profile, or for the whole installation when
/// unscoped.
#[derive(Debug, Clone, Default)]
pub struct OverviewCounts {
    pub total_views: i64,
    pub unique_visitors: i64,
    pub total_clicks: i64,
}

/// One calendar day (UTC, `YYYY-MM-DD`) with its event count. Days without
/// events are never materialized.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DayCount {
    pub day: String,
    pub count: i64,
}

/// One dimension value with its event count. Missing values surface under
/// the label "unknown".
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DimensionCount {
    pub label: String,
    pub count: i64,
}

/// One UTM (source, medium, campaign) triple with its view count. Missing
/// members render as "-".
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCount {
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub count: i64,
}

/// Click count for one content block, labeled with the most recent non-null
/// label recorded for it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlockStat {
    pub block_id: String,
    pub block_type: String,
    pub label: Option<String>,
    pub clicks: i64,
}

/// View count for one profile with its display metadata. Metadata is null
/// when no profile projection row exists.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewCount {
    pub profile_id: String,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub views: i64,
}
