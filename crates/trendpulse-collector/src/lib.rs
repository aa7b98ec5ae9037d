//! Per-country trend collection: fetch from the sources, persist into the
//! day's bucket, recompute its statistics.

pub mod collector;
pub mod issue_news;
pub mod recorded;
pub mod store;

pub use collector::{
    CollectError, CollectionSummary, CollectorSettings, CollectorSources, TrendCollector,
};
pub use issue_news::{issue_keywords_as_news, ISSUE_NEWS_SOURCE};
pub use recorded::{run_recorded_collection, RecordedCollection, RecordedRunError};
pub use store::{PgTrendStore, TrendStore};
