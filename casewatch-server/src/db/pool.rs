//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and an acquire timeout
//! so a dead database fails fast instead of stalling requests.

use casewatch_core::config::DatabaseSection;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

fn pool_options(settings: &DatabaseSection) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .acquire_timeout(settings.acquire_timeout())
}

/// Create a PostgreSQL connection pool, connecting immediately.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
pub async fn create_pool(database_url: &str, settings: &DatabaseSection) -> Result<PgPool, sqlx::Error> {
    pool_options(settings).connect(database_url).await
}

/// Create a pool that connects on first use.
///
/// Only fails if `database_url` cannot be parsed. Connections are retried on
/// every acquire, so the live source recovers once the database is back.
pub fn create_lazy_pool(database_url: &str, settings: &DatabaseSection) -> Result<PgPool, sqlx::Error> {
    pool_options(settings).connect_lazy(database_url)
}
