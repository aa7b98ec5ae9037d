//! Collector behavior against an in-memory store and scripted sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use trendpulse_collector::{
    run_recorded_collection, CollectError, CollectorSettings, CollectorSources, TrendCollector,
    TrendStore,
};
use trendpulse_core::{composite_score, IssueKeyword, NormalizedNews, NormalizedVideo};
use trendpulse_db::{DbError, KeywordBucketRow, UpsertCounts};
use trendpulse_sources::{
    IssueBoardSource, NewsFeedSource, SourceError, TrendingVideoSource, VideoSearchSource,
};

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    bucket_country: Option<String>,
    videos: HashMap<String, NormalizedVideo>,
    news: Vec<NormalizedNews>,
}

#[derive(Default)]
struct MemoryStore {
    state: Mutex<StoreState>,
    fail_bucket: bool,
    fail_recompute: bool,
}

const BUCKET_ID: i64 = 1;

impl MemoryStore {
    fn news_titles(&self) -> Vec<String> {
        let state = self.state.lock().expect("store lock");
        state.news.iter().map(|n| n.title.clone()).collect()
    }

    fn news(&self) -> Vec<NormalizedNews> {
        self.state.lock().expect("store lock").news.clone()
    }

    fn bucket_row(state: &StoreState) -> KeywordBucketRow {
        let videos = i64::try_from(state.videos.len()).expect("fits");
        let news = i64::try_from(state.news.len()).expect("fits");
        KeywordBucketRow {
            id: BUCKET_ID,
            keyword: "Trending_TEST".to_string(),
            country: state.bucket_country.clone().unwrap_or_default(),
            trend_volume: 0,
            rank: 0,
            collected_at: Utc::now(),
            video_count: i32::try_from(videos).expect("fits"),
            news_count: i32::try_from(news).expect("fits"),
            social_count: 0,
            composite_score: composite_score(videos, news),
        }
    }
}

#[async_trait]
impl TrendStore for MemoryStore {
    async fn get_or_create_bucket(&self, country: &str) -> Result<KeywordBucketRow, DbError> {
        if self.fail_bucket {
            return Err(DbError::NotFound);
        }
        let mut state = self.state.lock().expect("store lock");
        state.bucket_country = Some(country.to_string());
        Ok(Self::bucket_row(&state))
    }

    async fn upsert_videos(
        &self,
        _bucket_id: i64,
        _country: &str,
        videos: &[NormalizedVideo],
    ) -> UpsertCounts {
        let mut state = self.state.lock().expect("store lock");
        let mut counts = UpsertCounts::default();
        for video in videos {
            if !video.has_natural_key() {
                counts.skipped += 1;
            } else if state
                .videos
                .insert(video.video_id.clone(), video.clone())
                .is_some()
            {
                counts.updated += 1;
            } else {
                counts.inserted += 1;
            }
        }
        counts
    }

    async fn upsert_news(
        &self,
        _bucket_id: i64,
        _country: &str,
        items: &[NormalizedNews],
    ) -> UpsertCounts {
        let mut state = self.state.lock().expect("store lock");
        state.news.extend_from_slice(items);
        UpsertCounts {
            inserted: items.len(),
            ..UpsertCounts::default()
        }
    }

    async fn recompute_statistics(&self, _bucket_id: i64) -> Result<KeywordBucketRow, DbError> {
        if self.fail_recompute {
            return Err(DbError::NotFound);
        }
        let state = self.state.lock().expect("store lock");
        Ok(Self::bucket_row(&state))
    }
}

// ---------------------------------------------------------------------------
// Scripted sources
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeTrending {
    videos: Vec<NormalizedVideo>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

#[async_trait]
impl TrendingVideoSource for FakeTrending {
    fn name(&self) -> &'static str {
        "fake_trending"
    }

    async fn fetch_trending(
        &self,
        _country: &str,
        _max_results: u32,
    ) -> Result<Vec<NormalizedVideo>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SourceError::UnexpectedStatus {
                status: 500,
                url: "http://trending".to_string(),
            });
        }
        Ok(self.videos.clone())
    }
}

#[derive(Default)]
struct FakeSearch {
    videos: Vec<NormalizedVideo>,
    queries: Mutex<Vec<(String, u32)>>,
}

#[async_trait]
impl VideoSearchSource for FakeSearch {
    fn name(&self) -> &'static str {
        "fake_search"
    }

    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<NormalizedVideo>, SourceError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push((query.to_string(), max_results));
        Ok(self.videos.clone())
    }
}

#[derive(Default)]
struct FakeNews {
    items: Vec<NormalizedNews>,
}

#[async_trait]
impl NewsFeedSource for FakeNews {
    fn name(&self) -> &'static str {
        "fake_news"
    }

    async fn fetch(&self, _country: &str) -> Result<Vec<NormalizedNews>, SourceError> {
        Ok(self.items.clone())
    }
}

#[derive(Default)]
struct FakeBoard {
    keywords: Vec<IssueKeyword>,
    calls: AtomicUsize,
}

#[async_trait]
impl IssueBoardSource for FakeBoard {
    fn name(&self) -> &'static str {
        "fake_board"
    }

    async fn fetch(&self) -> Result<Vec<IssueKeyword>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.keywords.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn video(id: &str) -> NormalizedVideo {
    NormalizedVideo {
        video_id: id.to_string(),
        title: format!("video {id}"),
        channel: None,
        views: Some(10),
        likes: Some(1),
        published_at: None,
        url: format!("https://www.youtube.com/watch?v={id}"),
    }
}

fn article(title: &str) -> NormalizedNews {
    NormalizedNews {
        title: title.to_string(),
        source: "Google News".to_string(),
        description: String::new(),
        published_at: None,
        url: format!("https://news.example/{title}"),
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    trending: Arc<FakeTrending>,
    search: Arc<FakeSearch>,
    board: Arc<FakeBoard>,
    collector: TrendCollector<Arc<MemoryStore>>,
}

fn harness(
    store: MemoryStore,
    trending: FakeTrending,
    search: FakeSearch,
    news: FakeNews,
    board: FakeBoard,
) -> Harness {
    let store = Arc::new(store);
    let trending = Arc::new(trending);
    let search = Arc::new(search);
    let board = Arc::new(board);

    let sources = CollectorSources {
        trending: trending.clone(),
        search: search.clone(),
        news: Arc::new(news),
        issue_board: board.clone(),
    };
    let settings = CollectorSettings {
        source_timeout: Duration::from_millis(200),
        ..CollectorSettings::default()
    };

    Harness {
        collector: TrendCollector::new(Arc::clone(&store), sources, settings),
        store,
        trending,
        search,
        board,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn five_videos_and_three_news_make_eight_items() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending {
            videos: (1..=5).map(|i| video(&format!("v{i}"))).collect(),
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews {
            items: vec![article("a"), article("b"), article("c")],
        },
        FakeBoard::default(),
    );

    let summary = h.collector.collect("US").await.expect("collect");

    assert!(summary.success);
    assert_eq!(summary.item_count, 8);
    assert_eq!(summary.video_items, 5);
    assert_eq!(summary.news_items, 3);
    assert_eq!(summary.message, "collected 8 items for US");
    assert!(summary.statistics_refreshed);
    assert_eq!(summary.composite_score, Some(10.5));
    assert!(summary.source_failures.is_empty());
}

#[tokio::test]
async fn empty_trending_in_primary_market_searches_rank_one_keyword() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending::default(),
        FakeSearch {
            videos: vec![video("found1"), video("found2")],
            ..FakeSearch::default()
        },
        FakeNews::default(),
        FakeBoard {
            keywords: vec![IssueKeyword::new("B", 2), IssueKeyword::new("A", 1)],
            ..FakeBoard::default()
        },
    );

    let summary = h.collector.collect("KR").await.expect("collect");

    let queries = h.search.queries.lock().expect("lock").clone();
    assert_eq!(queries, vec![("A".to_string(), 10)]);
    assert!(summary.used_video_fallback);
    assert_eq!(summary.video_items, 2);
}

#[tokio::test]
async fn primary_market_calls_issue_board_for_fallback_and_news() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending::default(),
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard {
            keywords: vec![IssueKeyword::new("A", 1)],
            ..FakeBoard::default()
        },
    );

    h.collector.collect("KR").await.expect("collect");

    assert_eq!(h.board.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn issue_keywords_precede_feed_items_in_rank_order() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending {
            videos: vec![video("v1")],
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews {
            items: vec![article("feed")],
        },
        FakeBoard {
            keywords: vec![
                IssueKeyword::new("K2", 2),
                IssueKeyword::new("K1", 1),
                IssueKeyword::new("K3", 3),
            ],
            ..FakeBoard::default()
        },
    );

    let summary = h.collector.collect("KR").await.expect("collect");

    assert_eq!(
        h.store.news_titles(),
        vec!["🔥 K1", "🔥 K2", "🔥 K3", "feed"]
    );
    assert_eq!(summary.news_items, 4);
    assert!(!summary.used_video_fallback);
    // Trending was non-empty, so only the augmentation call happens.
    assert_eq!(h.board.calls.load(Ordering::SeqCst), 1);

    let stored = h.store.news();
    assert_eq!(stored[0].source, "실시간 검색어");
    assert_eq!(stored[0].url, "https://www.google.com/search?q=K1");
    assert_eq!(stored[3].source, "Google News");
    assert!(stored.iter().all(|n| n.published_at.is_some()));
}

#[tokio::test]
async fn other_markets_never_touch_the_issue_board() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending::default(),
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard {
            keywords: vec![IssueKeyword::new("A", 1)],
            ..FakeBoard::default()
        },
    );

    let summary = h.collector.collect("jp").await.expect("collect");

    assert_eq!(summary.country, "JP");
    assert_eq!(h.board.calls.load(Ordering::SeqCst), 0);
    assert!(h.search.queries.lock().expect("lock").is_empty());
    assert!(!summary.used_video_fallback);
}

#[tokio::test]
async fn all_empty_run_succeeds_with_zero_items() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending::default(),
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let summary = h.collector.collect("KR").await.expect("collect");

    assert!(summary.success);
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.message, "collected 0 items for KR");
    assert_eq!(summary.composite_score, Some(0.0));
}

#[tokio::test]
async fn bucket_failure_is_fatal_and_skips_sources() {
    let h = harness(
        MemoryStore {
            fail_bucket: true,
            ..MemoryStore::default()
        },
        FakeTrending::default(),
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let err = h.collector.collect("KR").await.expect_err("bucket fails");

    match err {
        CollectError::BucketResolution { country, .. } => assert_eq!(country, "KR"),
        CollectError::EmptyCountry => panic!("wrong error"),
    }
    assert_eq!(h.trending.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_country_is_rejected() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending::default(),
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let err = h.collector.collect("   ").await.expect_err("blank");
    assert!(matches!(err, CollectError::EmptyCountry));
    assert_eq!(h.trending.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_source_is_recorded_and_run_continues() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending {
            fail: true,
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews {
            items: vec![article("a")],
        },
        FakeBoard::default(),
    );

    let summary = h.collector.collect("US").await.expect("collect");

    assert!(summary.success);
    assert_eq!(summary.item_count, 1);
    assert_eq!(summary.source_failures.len(), 1);
    assert_eq!(summary.source_failures[0].source, "fake_trending");
    assert!(summary.source_failures[0].reason.contains("500"));
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out_and_degrades_to_empty() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending {
            videos: vec![video("late")],
            delay: Some(Duration::from_secs(60)),
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let summary = h.collector.collect("US").await.expect("collect");

    assert_eq!(summary.video_items, 0);
    assert_eq!(summary.source_failures.len(), 1);
    assert!(summary.source_failures[0].reason.starts_with("timed out"));
}

#[tokio::test]
async fn statistics_failure_is_not_fatal() {
    let h = harness(
        MemoryStore {
            fail_recompute: true,
            ..MemoryStore::default()
        },
        FakeTrending {
            videos: vec![video("v1")],
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let summary = h.collector.collect("US").await.expect("collect");

    assert!(summary.success);
    assert_eq!(summary.item_count, 1);
    assert!(!summary.statistics_refreshed);
    assert!(summary.composite_score.is_none());
}

#[tokio::test]
async fn repeated_video_counts_as_update_contribution() {
    let h = harness(
        MemoryStore::default(),
        FakeTrending {
            videos: vec![video("same")],
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let first = h.collector.collect("US").await.expect("first");
    let second = h.collector.collect("US").await.expect("second");

    assert_eq!(first.video_items, 1);
    assert_eq!(second.video_items, 1);
    assert_eq!(second.composite_score, Some(1.5));
}

// ---------------------------------------------------------------------------
// Recorded runs (live database)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn recorded_run_succeeds_when_completion_bookkeeping_fails(pool: sqlx::PgPool) {
    sqlx::query(
        "CREATE FUNCTION reject_run_completion() RETURNS trigger AS $$ \
         BEGIN \
             IF NEW.status = 'succeeded' THEN RAISE EXCEPTION 'bookkeeping down'; END IF; \
             RETURN NEW; \
         END $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .expect("create trigger function");
    sqlx::query(
        "CREATE TRIGGER reject_run_completion BEFORE UPDATE ON collection_runs \
         FOR EACH ROW EXECUTE FUNCTION reject_run_completion()",
    )
    .execute(&pool)
    .await
    .expect("create trigger");

    let h = harness(
        MemoryStore::default(),
        FakeTrending {
            videos: vec![video("v1")],
            ..FakeTrending::default()
        },
        FakeSearch::default(),
        FakeNews::default(),
        FakeBoard::default(),
    );

    let recorded = run_recorded_collection(&pool, &h.collector, "us", "api")
        .await
        .expect("stored content means a successful run");

    assert!(recorded.summary.success);
    assert_eq!(recorded.summary.item_count, 1);
    assert_eq!(recorded.summary.composite_score, Some(1.5));

    let row = trendpulse_db::get_collection_run(&pool, recorded.run_id)
        .await
        .expect("run row");
    assert_eq!(row.status, "running");
    assert_eq!(row.country, "US");
}

#[sqlx::test(migrations = "../../migrations")]
async fn recorded_run_marks_row_succeeded(pool: sqlx::PgPool) {
    let h = harness(
        MemoryStore::default(),
        FakeTrending::default(),
        FakeSearch::default(),
        FakeNews {
            items: vec![article("a"), article("b")],
        },
        FakeBoard::default(),
    );

    let recorded = run_recorded_collection(&pool, &h.collector, "US", "cli")
        .await
        .expect("recorded run");

    let row = trendpulse_db::get_collection_run(&pool, recorded.run_id)
        .await
        .expect("run row");
    assert_eq!(row.status, "succeeded");
    assert_eq!(row.records_processed, 2);
    assert_eq!(row.trigger_source, "cli");
}
