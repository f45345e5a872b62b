use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::{
    BlockStat, CampaignCount, DayCount, DimensionCount, LinkClickRow, NewLinkClick, NewPageView,
    OverviewCounts, PageViewRow, ProfileViewCount,
};
use crate::storage::{Dimension, Storage, StorageResult};

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to SQLite database")?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS page_views (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id TEXT NOT NULL,
                visitor_hash TEXT NOT NULL,
                session_id TEXT,
                referrer TEXT,
                user_agent TEXT,
                device_type TEXT NOT NULL,
                browser_name TEXT NOT NULL,
                os_name TEXT NOT NULL,
                country TEXT,
                region TEXT,
                city TEXT,
                utm_source TEXT,
                utm_medium TEXT,
                utm_campaign TEXT,
                utm_content TEXT,
                utm_term TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_page_views_profile_created
             ON page_views(profile_id, created_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_page_views_created ON page_views(created_at)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS link_clicks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id TEXT NOT NULL,
                block_id TEXT NOT NULL,
                visitor_hash TEXT NOT NULL,
                block_type TEXT NOT NULL,
                target_url TEXT,
                label TEXT,
                device_type TEXT NOT NULL,
                country TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_link_clicks_profile_created
             ON link_clicks(profile_id, created_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                handle TEXT NOT NULL,
                display_name TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert_page_view(&self, view: &NewPageView) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO page_views (
                profile_id, visitor_hash, session_id, referrer, user_agent,
                device_type, browser_name, os_name, country, region, city,
                utm_source, utm_medium, utm_campaign, utm_content, utm_term,
                created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(view.profile_id.as_str())
        .bind(view.visitor_hash.as_str())
        .bind(view.session_id.as_deref())
        .bind(view.referrer.as_deref())
        .bind(view.user_agent.as_deref())
        .bind(view.device_type)
        .bind(view.browser_name)
        .bind(view.os_name)
        .bind(view.country.as_deref())
        .bind(view.region.as_deref())
        .bind(view.city.as_deref())
        .bind(view.utm_source.as_deref())
        .bind(view.utm_medium.as_deref())
        .bind(view.utm_campaign.as_deref())
        .bind(view.utm_content.as_deref())
        .bind(view.utm_term.as_deref())
        .bind(view.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert_link_click(&self, click: &NewLinkClick) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO link_clicks (
                profile_id, block_id, visitor_hash, block_type, target_url,
                label, device_type, country, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(click.profile_id.as_str())
        .bind(click.block_id.as_str())
        .bind(click.visitor_hash.as_str())
        .bind(click.block_type.as_str())
        .bind(click.target_url.as_deref())
        .bind(click.label.as_deref())
        .bind(click.device_type)
        .bind(click.country.as_deref())
        .bind(click.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn upsert_profile(
        &self,
        id: &str,
        handle: &str,
        display_name: Option<&str>,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, handle, display_name)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                handle = excluded.handle,
                display_name = excluded.display_name
            "#,
        )
        .bind(id)
        .bind(handle)
        .bind(display_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn overview(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<OverviewCounts> {
        let (total_views, unique_visitors) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT visitor_hash)
            FROM page_views
            WHERE (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        let total_clicks = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM link_clicks
            WHERE (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(OverviewCounts {
            total_views,
            unique_visitors,
            total_clicks,
        })
    }

    async fn views_by_day(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<Vec<DayCount>> {
        let rows = sqlx::query_as::<_, DayCount>(
            r#"
            SELECT strftime('%Y-%m-%d', created_at, 'unixepoch') AS day, COUNT(*) AS count
            FROM page_views
            WHERE (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn clicks_by_day(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<Vec<DayCount>> {
        let rows = sqlx::query_as::<_, DayCount>(
            r#"
            SELECT strftime('%Y-%m-%d', created_at, 'unixepoch') AS day, COUNT(*) AS count
            FROM link_clicks
            WHERE (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn breakdown(
        &self,
        dimension: Dimension,
        profile_id: Option<&str>,
        since: Option<i64>,
        limit: Option<i64>,
    ) -> StorageResult<Vec<DimensionCount>> {
        let sql = format!(
            r#"
            SELECT COALESCE({col}, 'unknown') AS label, COUNT(*) AS count
            FROM page_views
            WHERE (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            GROUP BY label
            ORDER BY count DESC, label ASC
            LIMIT ?
            "#,
            col = dimension.column()
        );

        // A negative LIMIT means no upper bound in SQLite
        let rows = sqlx::query_as::<_, DimensionCount>(&sql)
            .bind(profile_id)
            .bind(profile_id)
            .bind(since)
            .bind(since)
            .bind(limit.unwrap_or(-1))
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows)
    }

    async fn referrer_counts(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
    ) -> StorageResult<Vec<DimensionCount>> {
        let rows = sqlx::query_as::<_, DimensionCount>(
            r#"
            SELECT COALESCE(referrer, '') AS label, COUNT(*) AS count
            FROM page_views
            WHERE (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            GROUP BY label
            ORDER BY count DESC, label ASC
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn utm_campaigns(
        &self,
        profile_id: Option<&str>,
        since: Option<i64>,
        limit: i64,
    ) -> StorageResult<Vec<CampaignCount>> {
        let rows = sqlx::query_as::<_, CampaignCount>(
            r#"
            SELECT COALESCE(utm_source, '-') AS utm_source,
                   COALESCE(utm_medium, '-') AS utm_medium,
                   COALESCE(utm_campaign, '-') AS utm_campaign,
                   COUNT(*) AS count
            FROM page_views
            WHERE (utm_source IS NOT NULL OR utm_medium IS NOT NULL OR utm_campaign IS NOT NULL)
              AND (? IS NULL OR profile_id = ?)
              AND (? IS NULL OR created_at >= ?)
            GROUP BY 1, 2, 3
            ORDER BY count DESC
            LIMIT ?
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn top_blocks(
        &self,
        profile_id: &str,
        since: Option<i64>,
        limit: i64,
    ) -> StorageResult<Vec<BlockStat>> {
        let rows = sqlx::query_as::<_, BlockStat>(
            r#"
            SELECT lc.block_id,
                   lc.block_type,
                   (
                       SELECT label FROM link_clicks
                       WHERE profile_id = ?
                         AND block_id = lc.block_id
                         AND block_type = lc.block_type
                         AND label IS NOT NULL
                       ORDER BY created_at DESC, id DESC
                       LIMIT 1
                   ) AS label,
                   COUNT(*) AS clicks
            FROM link_clicks lc
            WHERE lc.profile_id = ?
              AND (? IS NULL OR lc.created_at >= ?)
            GROUP BY lc.block_id, lc.block_type
            ORDER BY clicks DESC, lc.block_id ASC
            LIMIT ?
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .bind(since)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn top_profiles(
        &self,
        since: Option<i64>,
        limit: i64,
    ) -> StorageResult<Vec<ProfileViewCount>> {
        let rows = sqlx::query_as::<_, ProfileViewCount>(
            r#"
            SELECT pv.profile_id, p.handle, p.display_name, COUNT(*) AS views
            FROM page_views pv
            LEFT JOIN profiles p ON p.id = pv.profile_id
            WHERE (? IS NULL OR pv.created_at >= ?)
            GROUP BY pv.profile_id, p.handle, p.display_name
            ORDER BY views DESC, pv.profile_id ASC
            LIMIT ?
            "#,
        )
        .bind(since)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn recent_page_views(
        &self,
        profile_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<PageViewRow>> {
        let rows = sqlx::query_as::<_, PageViewRow>(
            r#"
            SELECT id, profile_id, visitor_hash, session_id, referrer, user_agent,
                   device_type, browser_name, os_name, country, region, city,
                   utm_source, utm_medium, utm_campaign, utm_content, utm_term,
                   created_at
            FROM page_views
            WHERE profile_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(profile_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn recent_link_clicks(
        &self,
        profile_id: &str,
        limit: i64,
    ) -> StorageResult<Vec<LinkClickRow>> {
        let rows = sqlx::query_as::<_, LinkClickRow>(
            r#"
            SELECT id, profile_id, block_id, visitor_hash, block_type, target_url,
                   label, device_type, country, created_at
            FROM link_clicks
            WHERE profile_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(profile_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }
}
