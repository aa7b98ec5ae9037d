//! Offline tests for trendpulse-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Utc;
use trendpulse_core::{AppConfig, Environment, IssueBoardKind};
use trendpulse_db::{
    CollectionRunRow, KeywordBucketRow, PoolConfig, UpsertAction, UpsertCounts, VideoContentRow,
};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        primary_market: "KR".to_string(),
        countries: vec!["KR".to_string()],
        issue_board: IssueBoardKind::SignalBz,
        youtube_api_key: None,
        source_timeout_secs: 10,
        source_max_retries: 1,
        source_backoff_base_secs: 1,
        user_agent: "ua".to_string(),
        trending_max_results: 20,
        fallback_max_results: 10,
        collect_cron: "0 0 * * * *".to_string(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn collection_run_row_has_expected_fields() {
    let row = CollectionRunRow {
        id: 1,
        public_id: Uuid::new_v4(),
        country: "KR".to_string(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        records_processed: 0,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.country, "KR");
    assert_eq!(row.status, "queued");
    assert!(row.completed_at.is_none());
}

#[test]
fn bucket_row_serializes_statistics() {
    let row = KeywordBucketRow {
        id: 3,
        keyword: "Trending_KR_20261019".to_string(),
        country: "KR".to_string(),
        trend_volume: 0,
        rank: 0,
        collected_at: Utc::now(),
        video_count: 5,
        news_count: 3,
        social_count: 0,
        composite_score: 10.5,
    };

    let json = serde_json_value(&row);
    assert!(json.contains("\"composite_score\":10.5"));
    assert!(json.contains("\"keyword\":\"Trending_KR_20261019\""));
}

#[test]
fn video_row_counters_are_non_optional() {
    let row = VideoContentRow {
        id: 1,
        bucket_id: 3,
        video_id: "abc".to_string(),
        title: Some("t".to_string()),
        channel: None,
        views: 0,
        likes: 0,
        published_at: None,
        url: None,
        collected_at: Utc::now(),
        country: Some("KR".to_string()),
    };

    assert_eq!(row.views + row.likes, 0);
}

#[test]
fn upsert_counts_track_actions() {
    let mut counts = UpsertCounts::default();
    counts.record(UpsertAction::Inserted);
    counts.record(UpsertAction::Updated);
    counts.failed += 1;

    assert_eq!(counts.processed(), 2);
    assert_eq!(counts.failed, 1);
}

fn serde_json_value<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("row serializes")
}
