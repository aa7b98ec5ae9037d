//! Shared domain types and configuration for trendpulse.

pub mod app_config;
pub mod bucket;
pub mod config;
pub mod content;
pub mod locale;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, IssueBoardKind};
pub use bucket::{
    composite_score, day_label, normalize_country, NEWS_WEIGHT, VIDEO_WEIGHT,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use content::{IssueKeyword, NormalizedNews, NormalizedSocialPost, NormalizedVideo};
pub use locale::{news_locale, NewsLocale};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
