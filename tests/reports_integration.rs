//! Integration tests for the aggregation queries and dashboard facades
//!
//! Events are inserted at pinned timestamps so day bucketing, range
//! filtering and the unique-visitor day boundary are all deterministic.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use linkpulse::analytics::reports;
use linkpulse::analytics::{hash_visitor, TimeRange};
use linkpulse::models::{NewLinkClick, NewPageView};
use linkpulse::storage::{Dimension, SqliteStorage, Storage};
use std::sync::Arc;

/// Helper to create test storage
async fn create_test_storage() -> Arc<dyn Storage> {
    // One connection only: every pool connection would otherwise get its own
    // in-memory database
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

fn page_view(profile_id: &str, visitor_hash: &str, created_at: i64) -> NewPageView {
    NewPageView {
        profile_id: profile_id.to_string(),
        visitor_hash: visitor_hash.to_string(),
        session_id: None,
        referrer: None,
        user_agent: None,
        device_type: "desktop",
        browser_name: "Chrome",
        os_name: "macOS",
        country: None,
        region: None,
        city: None,
        utm_source: None,
        utm_medium: None,
        utm_campaign: None,
        utm_content: None,
        utm_term: None,
        created_at,
    }
}

fn link_click(
    profile_id: &str,
    block_id: &str,
    label: Option<&str>,
    created_at: i64,
) -> NewLinkClick {
    NewLinkClick {
        profile_id: profile_id.to_string(),
        block_id: block_id.to_string(),
        visitor_hash: "click-visitor".to_string(),
        block_type: "link".to_string(),
        target_url: None,
        label: label.map(str::to_string),
        device_type: "mobile",
        country: None,
        created_at,
    }
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap().timestamp()
}

#[tokio::test]
async fn test_unique_visitors_rotate_at_day_boundary() {
    let storage = create_test_storage().await;

    // Same IP, three views: two on June 10, one just past midnight June 11.
    // The daily salt makes that two distinct visitors.
    let day1 = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
    let hash1 = hash_visitor("203.0.113.5", day1);
    let hash2 = hash_visitor("203.0.113.5", day2);

    storage
        .insert_page_view(&page_view("p1", &hash1, at(2024, 6, 10, 12, 0, 0)))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view("p1", &hash1, at(2024, 6, 10, 23, 59, 59)))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view("p1", &hash2, at(2024, 6, 11, 0, 1, 0)))
        .await
        .unwrap();

    let counts = storage.overview(Some("p1"), None).await.unwrap();
    assert_eq!(counts.total_views, 3);
    assert_eq!(counts.unique_visitors, 2);
}

#[tokio::test]
async fn test_views_by_day_skips_empty_days() {
    let storage = create_test_storage().await;

    storage
        .insert_page_view(&page_view("p1", "v1", at(2024, 6, 10, 8, 0, 0)))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view("p1", "v2", at(2024, 6, 10, 20, 0, 0)))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view("p1", "v3", at(2024, 6, 12, 9, 30, 0)))
        .await
        .unwrap();

    let days = storage.views_by_day(Some("p1"), None).await.unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].day, "2024-06-10");
    assert_eq!(days[0].count, 2);
    assert_eq!(days[1].day, "2024-06-12");
    assert_eq!(days[1].count, 1);
}

#[tokio::test]
async fn test_breakdown_sums_match_overview_total() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    let mut a = page_view("p1", "v1", base);
    a.country = Some("US".to_string());
    let mut b = page_view("p1", "v2", base + 60);
    b.country = Some("US".to_string());
    let mut c = page_view("p1", "v3", base + 120);
    c.device_type = "mobile";
    c.browser_name = "Safari";
    // No country on c: it must surface as "unknown", not vanish
    let mut d = page_view("p1", "v4", base + 180);
    d.device_type = "tablet";
    d.browser_name = "Firefox";
    d.country = Some("DE".to_string());

    for view in [&a, &b, &c, &d] {
        storage.insert_page_view(view).await.unwrap();
    }

    let counts = storage.overview(Some("p1"), None).await.unwrap();
    assert_eq!(counts.total_views, 4);

    for dimension in [
        Dimension::Device,
        Dimension::Browser,
        Dimension::Country,
        Dimension::Os,
    ] {
        let breakdown = storage
            .breakdown(dimension, Some("p1"), None, None)
            .await
            .unwrap();
        let sum: i64 = breakdown.iter().map(|entry| entry.count).sum();
        assert_eq!(sum, counts.total_views, "{:?} breakdown lost rows", dimension);
    }

    let countries = storage
        .breakdown(Dimension::Country, Some("p1"), None, None)
        .await
        .unwrap();
    let unknown = countries.iter().find(|e| e.label == "unknown").unwrap();
    assert_eq!(unknown.count, 1);
}

#[tokio::test]
async fn test_breakdown_orders_and_caps() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    let rows = [("US", 3), ("DE", 2), ("FR", 1)];
    let mut offset = 0;
    for (country, count) in rows {
        for _ in 0..count {
            let mut view = page_view("p1", "v", base + offset);
            view.country = Some(country.to_string());
            storage.insert_page_view(&view).await.unwrap();
            offset += 60;
        }
    }

    let top_two = storage
        .breakdown(Dimension::Country, Some("p1"), None, Some(2))
        .await
        .unwrap();
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].label, "US");
    assert_eq!(top_two[0].count, 3);
    assert_eq!(top_two[1].label, "DE");
    assert_eq!(top_two[1].count, 2);
}

#[tokio::test]
async fn test_range_filter_excludes_old_rows() {
    let storage = create_test_storage().await;
    let now = Utc::now();

    storage
        .insert_page_view(&page_view(
            "p1",
            "old",
            (now - Duration::days(100)).timestamp(),
        ))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view(
            "p1",
            "new",
            (now - Duration::days(1)).timestamp(),
        ))
        .await
        .unwrap();

    let recent = storage
        .overview(Some("p1"), TimeRange::Days7.since(now))
        .await
        .unwrap();
    assert_eq!(recent.total_views, 1);

    // "all" omits the bound entirely
    let all = storage
        .overview(Some("p1"), TimeRange::All.since(now))
        .await
        .unwrap();
    assert_eq!(all.total_views, 2);
}

#[tokio::test]
async fn test_utm_campaigns_grouping() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    let mut twitter1 = page_view("p1", "v1", base);
    twitter1.utm_source = Some("twitter".to_string());
    twitter1.utm_campaign = Some("launch".to_string());
    let mut twitter2 = page_view("p1", "v2", base + 60);
    twitter2.utm_source = Some("twitter".to_string());
    twitter2.utm_campaign = Some("launch".to_string());
    let mut newsletter = page_view("p1", "v3", base + 120);
    newsletter.utm_source = Some("news".to_string());
    newsletter.utm_medium = Some("email".to_string());
    // No UTM fields at all: excluded from the report
    let organic = page_view("p1", "v4", base + 180);

    for view in [&twitter1, &twitter2, &newsletter, &organic] {
        storage.insert_page_view(view).await.unwrap();
    }

    let campaigns = storage.utm_campaigns(Some("p1"), None, 20).await.unwrap();
    assert_eq!(campaigns.len(), 2);

    assert_eq!(campaigns[0].utm_source, "twitter");
    assert_eq!(campaigns[0].utm_medium, "-");
    assert_eq!(campaigns[0].utm_campaign, "launch");
    assert_eq!(campaigns[0].count, 2);

    assert_eq!(campaigns[1].utm_source, "news");
    assert_eq!(campaigns[1].utm_medium, "email");
    assert_eq!(campaigns[1].utm_campaign, "-");
    assert_eq!(campaigns[1].count, 1);
}

#[tokio::test]
async fn test_top_blocks_uses_most_recent_label() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    storage
        .insert_link_click(&link_click("p1", "b1", Some("Old Label"), base))
        .await
        .unwrap();
    storage
        .insert_link_click(&link_click("p1", "b1", None, base + 60))
        .await
        .unwrap();
    storage
        .insert_link_click(&link_click("p1", "b1", Some("New Label"), base + 120))
        .await
        .unwrap();
    storage
        .insert_link_click(&link_click("p1", "b1", None, base + 180))
        .await
        .unwrap();
    storage
        .insert_link_click(&link_click("p1", "b2", None, base + 240))
        .await
        .unwrap();

    let blocks = storage.top_blocks("p1", None, 20).await.unwrap();
    assert_eq!(blocks.len(), 2);

    assert_eq!(blocks[0].block_id, "b1");
    assert_eq!(blocks[0].clicks, 4);
    // Most recent non-null label wins, trailing null rows do not erase it
    assert_eq!(blocks[0].label.as_deref(), Some("New Label"));

    assert_eq!(blocks[1].block_id, "b2");
    assert_eq!(blocks[1].clicks, 1);
    assert_eq!(blocks[1].label, None);
}

#[tokio::test]
async fn test_top_profiles_joins_profile_metadata() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    storage.upsert_profile("p1", "alice", Some("Alice")).await.unwrap();
    storage.upsert_profile("p2", "bob", None).await.unwrap();

    let seed = [("p1", 3), ("p2", 2), ("p3", 1)];
    let mut offset = 0;
    for (profile, count) in seed {
        for _ in 0..count {
            storage
                .insert_page_view(&page_view(profile, "v", base + offset))
                .await
                .unwrap();
            offset += 60;
        }
    }

    let top = storage.top_profiles(None, 10).await.unwrap();
    assert_eq!(top.len(), 3);

    assert_eq!(top[0].profile_id, "p1");
    assert_eq!(top[0].handle.as_deref(), Some("alice"));
    assert_eq!(top[0].display_name.as_deref(), Some("Alice"));
    assert_eq!(top[0].views, 3);

    assert_eq!(top[1].profile_id, "p2");
    assert_eq!(top[1].handle.as_deref(), Some("bob"));
    assert_eq!(top[1].display_name, None);

    // Views for a profile without stored metadata still count
    assert_eq!(top[2].profile_id, "p3");
    assert_eq!(top[2].handle, None);
    assert_eq!(top[2].views, 1);
}

#[tokio::test]
async fn test_upsert_profile_replaces_metadata() {
    let storage = create_test_storage().await;

    storage.upsert_profile("p1", "alice", None).await.unwrap();
    storage
        .upsert_profile("p1", "alice-renamed", Some("Alice"))
        .await
        .unwrap();

    storage
        .insert_page_view(&page_view("p1", "v1", at(2024, 6, 10, 12, 0, 0)))
        .await
        .unwrap();

    let top = storage.top_profiles(None, 10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].handle.as_deref(), Some("alice-renamed"));
    assert_eq!(top[0].display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_profile_dashboard_composes_all_sections() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    let mut with_referrer1 = page_view("p1", "v1", base);
    with_referrer1.referrer = Some("https://t.co/one".to_string());
    let mut with_referrer2 = page_view("p1", "v2", base + 60);
    with_referrer2.referrer = Some("https://t.co/two".to_string());
    let direct1 = page_view("p1", "v3", base + 120);
    let direct2 = page_view("p1", "v4", base + 180);

    for view in [&with_referrer1, &with_referrer2, &direct1, &direct2] {
        storage.insert_page_view(view).await.unwrap();
    }
    storage
        .insert_link_click(&link_click("p1", "b1", Some("Shop"), base + 240))
        .await
        .unwrap();

    let dashboard = reports::profile_dashboard(storage.as_ref(), "p1", TimeRange::All)
        .await
        .unwrap();

    assert_eq!(dashboard.overview.total_views, 4);
    assert_eq!(dashboard.overview.total_clicks, 1);
    assert_eq!(dashboard.overview.click_rate, 0.25);

    // Raw referrer strings collapse to hosts, absent ones to "direct"
    let tco = dashboard.referrers.iter().find(|r| r.label == "t.co").unwrap();
    assert_eq!(tco.count, 2);
    let direct = dashboard
        .referrers
        .iter()
        .find(|r| r.label == "direct")
        .unwrap();
    assert_eq!(direct.count, 2);

    assert_eq!(dashboard.views_by_day.len(), 1);
    assert_eq!(dashboard.views_by_day[0].day, "2024-06-10");
    assert_eq!(dashboard.devices[0].label, "desktop");
    assert_eq!(dashboard.top_blocks.len(), 1);
    assert_eq!(dashboard.top_blocks[0].label.as_deref(), Some("Shop"));
}

#[tokio::test]
async fn test_global_dashboard_ranks_profiles() {
    let storage = create_test_storage().await;
    let base = at(2024, 6, 10, 12, 0, 0);

    storage.upsert_profile("p1", "alice", None).await.unwrap();

    storage
        .insert_page_view(&page_view("p1", "v1", base))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view("p1", "v2", base + 60))
        .await
        .unwrap();
    storage
        .insert_page_view(&page_view("p2", "v3", base + 120))
        .await
        .unwrap();

    let dashboard = reports::global_dashboard(storage.as_ref(), TimeRange::All, 15)
        .await
        .unwrap();

    assert_eq!(dashboard.top_profiles.len(), 2);
    assert_eq!(dashboard.top_profiles[0].profile_id, "p1");
    assert_eq!(dashboard.top_profiles[0].handle.as_deref(), Some("alice"));
    assert_eq!(dashboard.top_profiles[0].views, 2);

    let total_by_day: i64 = dashboard.views_by_day.iter().map(|d| d.count).sum();
    assert_eq!(total_by_day, 3);
    assert_eq!(dashboard.devices[0].label, "desktop");
    assert_eq!(dashboard.devices[0].count, 3);
}
