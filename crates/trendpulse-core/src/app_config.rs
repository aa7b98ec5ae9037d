use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which real-time issue board feeds the primary-market fallback and news
/// augmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueBoardKind {
    SignalBz,
    Nate,
    Reddit,
}

impl IssueBoardKind {
    /// Parse the `TRENDPULSE_ISSUE_BOARD` value. Returns `None` for unknown names.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "signal_bz" | "signal" => Some(Self::SignalBz),
            "nate" => Some(Self::Nate),
            "reddit" => Some(Self::Reddit),
            _ => None,
        }
    }
}

impl std::fmt::Display for IssueBoardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueBoardKind::SignalBz => write!(f, "signal_bz"),
            IssueBoardKind::Nate => write!(f, "nate"),
            IssueBoardKind::Reddit => write!(f, "reddit"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Country code that enables issue-board fallback and augmentation.
    pub primary_market: String,
    /// Countries collected by the scheduler and by a bare `collect` command.
    pub countries: Vec<String>,
    pub issue_board: IssueBoardKind,
    pub youtube_api_key: Option<String>,
    pub source_timeout_secs: u64,
    pub source_max_retries: u32,
    pub source_backoff_base_secs: u64,
    pub user_agent: String,
    pub trending_max_results: u32,
    pub fallback_max_results: u32,
    pub collect_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("primary_market", &self.primary_market)
            .field("countries", &self.countries)
            .field("issue_board", &self.issue_board)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("source_max_retries", &self.source_max_retries)
            .field("source_backoff_base_secs", &self.source_backoff_base_secs)
            .field("user_agent", &self.user_agent)
            .field("trending_max_results", &self.trending_max_results)
            .field("fallback_max_results", &self.fallback_max_results)
            .field("collect_cron", &self.collect_cron)
            .finish()
    }
}
