use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    BlockStat, CampaignCount, DayCount, DimensionCount, LinkClickRow, NewLinkClick, NewPageView,
    OverviewCounts, PageViewRow, ProfileViewCount,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Page view column a breakdown query groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Device,
    Browser,
    Country,
    Os,
}

impl Dimension {
    /// Column backing this dimension. Closed set, safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Device => "device_type",
            Dimension::Browser => "browser_name",
            Dimension::Country => "country",
            Dimension::Os => "os_name",
        }
    }
}

/// Datastore interface for the analytics engine.
///
/// Writes are append-only fact rows; reads are pure aggregations with no
/// side effects, safe to issue concurrently from the reporting facade.
/// Read methods scoped by `profile_id: Option<&str>` cover the whole
/// installation when `None`; `since: Option<i64>` is a unix-seconds lower
/// bound, and `None` means the filter is omitted entirely.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> StorageResult<()>;

    /// Persist one page view fact row
    async fn insert_page_view(&self, view: &NewPageView) -> StorageResult<()>;

    /// Persist one link click fact row
    async fn insert_link_click(&self, click: &NewLinkClick) -> StorageResult<()>;

    /// Create or replace the display metadata projection for a profile
    async fn upsert_profile(
        &self,
        id: &str,
        handle: &str,
        display_name: Option<&str>,
    ) -> StorageResult<()>;

    /// Event totals and distinct same-day visitors
    async fn overview(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<OverviewCounts>;

    /// Page views per UTC day, ascending; zero days are absent
    async fn views_by_day(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<Vec<DayCount>>;

    /// Link clicks per UTC day, ascending; zero days are absent
    async fn clicks_by_day(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<Vec<DayCount>>;

    /// Page view counts grouped by one classification dimension, descending.
    /// `limit: None` returns every group.
    async fn breakdown(
        &self,
        dimension: Dimension,
        profile_id: Option<&str>,
        since: Option<i64>,
        limit: Option<i64>,
    ) -> StorageResult<Vec<DimensionCount>>;

    /// Raw referrer values with counts, descending. Host normalization and
    /// the "direct" bucket are the reporting layer's job.
    async fn referrer_counts(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<Vec<DimensionCount>>;

    /// UTM (source, medium, campaign) triples over rows where at least one
    /// of the three is set, descending
    async fn utm_campaigns(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
        limit: i64,
    ) -> StorageResult<Vec<CampaignCount>>;

    /// Most clicked blocks of one profile with their latest non-null label
    async fn top_blocks(
        &self,
        profile_id: &str,
        since: Option<i64>,
        limit: i64,
    ) -> StorageResult<Vec<BlockStat>>;

    /// Most viewed profiles with display metadata, descending
    async fn top_profiles(
        &self,
        since: Option<i64>,
        limit: i64,
    ) -> StorageResult<Vec<ProfileViewCount>>;

    /// Recent page views of one profile, newest first
    async fn recent_page_views(
        &self,
        profile_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<PageViewRow>>;

    /// Recent link clicks of one profile, newest first
    async fn recent_link_clicks(
        &self,
        profile_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<LinkClickRow>>;
}
