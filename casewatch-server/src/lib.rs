//! casewatch-server: fraud case lookup API
//!
//! Serves case listings, details, search and statistics from PostgreSQL when
//! it is reachable and from the in-memory fallback dataset when it is not.

pub mod db;
pub mod error;
pub mod http;
pub mod repository;

use std::sync::Arc;

use casewatch_core::CasewatchConfig;

pub use error::{Result, ServerError};
pub use repository::{CaseRepository, CaseSource, DataSource, PgCaseSource, SourceError, Sourced};

/// Build the repository facade described by `config`.
///
/// The live pool is created lazily, so an unreachable database never stops
/// startup; queries against it simply degrade to the fallback dataset.
pub fn build_repository(config: &CasewatchConfig) -> Result<CaseRepository> {
    let fallback = Arc::new(config.fallback_dataset()?);
    tracing::info!(cases = fallback.len(), "Fallback dataset ready");

    let Some(url) = config.database.url.as_deref() else {
        tracing::warn!("No database URL configured, serving fallback dataset only");
        return Ok(CaseRepository::fallback_only(fallback));
    };

    config.database.validate()?;
    let pool = db::create_lazy_pool(url, &config.database)?;
    let primary: Arc<dyn CaseSource> = Arc::new(PgCaseSource::new(pool));
    Ok(CaseRepository::new(
        Some(primary),
        fallback,
        config.database.query_timeout(),
    ))
}
