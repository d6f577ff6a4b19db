//! Live case sources

use std::time::Duration;

use async_trait::async_trait;
use casewatch_core::{Case, CaseDetail, CaseFilter, FilterOptions, PageRequest, Statistics};
use sqlx::PgPool;

use crate::db::{CaseRepo, DbError};

/// Failure of a live source. Always recovered by the facade.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Queryable case store (testable)
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), SourceError>;

    async fn list_cases(
        &self,
        page: PageRequest,
        filter: &CaseFilter,
    ) -> Result<Vec<Case>, SourceError>;

    async fn get_case_detail(&self, case_id: &str) -> Result<Option<CaseDetail>, SourceError>;

    async fn search_cases(&self, term: &str, limit: u32) -> Result<Vec<Case>, SourceError>;

    async fn statistics(&self) -> Result<Statistics, SourceError>;

    async fn filter_options(&self) -> Result<FilterOptions, SourceError>;
}

/// PostgreSQL-backed source
#[derive(Clone)]
pub struct PgCaseSource {
    pool: PgPool,
}

impl PgCaseSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn repo(&self) -> CaseRepo<'_> {
        CaseRepo::new(&self.pool)
    }
}

#[async_trait]
impl CaseSource for PgCaseSource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), SourceError> {
        Ok(self.repo().ping().await?)
    }

    async fn list_cases(
        &self,
        page: PageRequest,
        filter: &CaseFilter,
    ) -> Result<Vec<Case>, SourceError> {
        Ok(self.repo().list(page, filter).await?)
    }

    async fn get_case_detail(&self, case_id: &str) -> Result<Option<CaseDetail>, SourceError> {
        Ok(self.repo().get_detail(case_id).await?)
    }

    async fn search_cases(&self, term: &str, limit: u32) -> Result<Vec<Case>, SourceError> {
        Ok(self.repo().search(term, limit).await?)
    }

    async fn statistics(&self) -> Result<Statistics, SourceError> {
        Ok(self.repo().statistics().await?)
    }

    async fn filter_options(&self) -> Result<FilterOptions, SourceError> {
        Ok(self.repo().filter_options().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_duration() {
        let err = SourceError::Timeout {
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "timed out after 1.5s");
    }

    #[test]
    fn database_error_is_transparent() {
        let err = SourceError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        assert!(err.to_string().starts_with("database error"));
    }

    #[tokio::test]
    async fn unreachable_pool_fails_ping() {
        let settings = casewatch_core::config::DatabaseSection {
            acquire_timeout_ms: 200,
            ..Default::default()
        };
        let pool = crate::db::create_lazy_pool("postgres://casewatch@127.0.0.1:1/none", &settings)
            .expect("lazy pool");
        let source = PgCaseSource::new(pool);
        assert!(source.ping().await.is_err());
    }
}
