//! Pool construction, schema migration and liveness checks.

use std::{str::FromStr, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::DbError;

/// Schema files live in `<workspace>/migrations`, two levels above this crate.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Sizing for the shared Postgres pool. One pool serves every collection
/// run in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    /// Read `TRENDPULSE_DB_*` overrides from the process environment.
    /// Unset or unparseable values keep the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_app_config(config: &trendpulse_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_connections: parsed_or(
                lookup("TRENDPULSE_DB_MAX_CONNECTIONS"),
                defaults.max_connections,
            ),
            min_connections: parsed_or(
                lookup("TRENDPULSE_DB_MIN_CONNECTIONS"),
                defaults.min_connections,
            ),
            acquire_timeout_secs: parsed_or(
                lookup("TRENDPULSE_DB_ACQUIRE_TIMEOUT_SECS"),
                defaults.acquire_timeout_secs,
            ),
        }
    }
}

fn parsed_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Open a pool against `database_url`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if no connection can be established within the
/// acquire timeout.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// [`connect_pool`] with `DATABASE_URL` and [`PoolConfig::from_env`].
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] when `DATABASE_URL` is unset and
/// [`DbError::Sqlx`] when the connection fails.
pub async fn connect_pool_from_env() -> Result<PgPool, DbError> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| DbError::MissingDatabaseUrl)?;
    Ok(connect_pool(&database_url, PoolConfig::from_env()).await?)
}

/// Bring the trend schema up to date. Returns how many migrations this call
/// applied; zero when the schema was already current.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    let before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await;

    Ok(usize::try_from(after.saturating_sub(before)).unwrap_or(0))
}

/// Zero on a fresh database, where the bookkeeping table does not exist yet.
async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Round-trip a trivial query.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the pool cannot serve it.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// [`ping`] with the error folded into [`DbError`], for the health endpoint
/// and `db ping`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the database is unreachable.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    Ok(ping(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_only_valid_values() {
        let env: HashMap<&str, &str> = [
            ("TRENDPULSE_DB_MAX_CONNECTIONS", " 25 "),
            ("TRENDPULSE_DB_MIN_CONNECTIONS", "lots"),
        ]
        .into_iter()
        .collect();

        let config = PoolConfig::from_lookup(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, PoolConfig::default().min_connections);
        assert_eq!(config.acquire_timeout_secs, 10);
    }

    #[test]
    fn empty_lookup_is_default() {
        assert_eq!(PoolConfig::from_lookup(|_| None), PoolConfig::default());
    }
}
