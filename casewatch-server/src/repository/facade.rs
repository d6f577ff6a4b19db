//! Two-tier lookup: live source first, fallback dataset on any failure

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use casewatch_core::{
    Case, CaseDetail, CaseFilter, FallbackDataset, FilterOptions, PageRequest, Statistics,
};
use serde::Serialize;

use super::source::{CaseSource, SourceError};

/// Which tier produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query result tagged with its origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            data: f(self.data),
            source: self.source,
        }
    }
}

/// Unified read interface over the live source and the fallback dataset.
///
/// Holds no mutable state; share it behind an `Arc`. Datastore failures never
/// reach callers: each operation logs the failure at `warn` and answers the
/// same query from the fallback dataset instead.
#[derive(Clone)]
pub struct CaseRepository {
    primary: Option<Arc<dyn CaseSource>>,
    fallback: Arc<FallbackDataset>,
    query_timeout: Duration,
}

impl CaseRepository {
    pub fn new(
        primary: Option<Arc<dyn CaseSource>>,
        fallback: Arc<FallbackDataset>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            query_timeout,
        }
    }

    /// Repository that always answers from `fallback`.
    pub fn fallback_only(fallback: Arc<FallbackDataset>) -> Self {
        Self::new(None, fallback, Duration::ZERO)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn fallback(&self) -> &FallbackDataset {
        &self.fallback
    }

    /// True iff a live source is configured and answers a ping in time.
    pub async fn is_available(&self) -> bool {
        let Some(primary) = self.primary.as_deref() else {
            return false;
        };
        match tokio::time::timeout(self.query_timeout, primary.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                tracing::debug!(source = primary.name(), %error, "Liveness probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(
                    source = primary.name(),
                    timeout = ?self.query_timeout,
                    "Liveness probe timed out"
                );
                false
            }
        }
    }

    /// Filtered listing, newest first.
    pub async fn list_cases(&self, page: PageRequest, filter: &CaseFilter) -> Sourced<Vec<Case>> {
        self.answer(
            "list_cases",
            |source| source.list_cases(page, filter),
            |fallback| fallback.list(page, filter),
        )
        .await
    }

    /// Case plus related entities.
    ///
    /// `None` from a healthy live source is a real not-found and is not
    /// retried against the fallback.
    pub async fn get_case_detail(&self, case_id: &str) -> Sourced<Option<CaseDetail>> {
        let found = self
            .answer(
                "get_case_detail",
                |source| source.get_case_detail(case_id),
                |fallback| fallback.get(case_id),
            )
            .await;
        if found.data.is_none() {
            tracing::debug!(case_id, source = %found.source, "Case not found");
        }
        found
    }

    /// Case-insensitive substring search, newest first.
    pub async fn search_cases(&self, term: &str, limit: u32) -> Sourced<Vec<Case>> {
        let limit = PageRequest::new(limit, 0).limit();
        self.answer(
            "search_cases",
            |source| source.search_cases(term, limit),
            |fallback| fallback.search(term, limit),
        )
        .await
    }

    pub async fn statistics(&self) -> Sourced<Statistics> {
        self.answer(
            "statistics",
            |source| source.statistics(),
            FallbackDataset::statistics,
        )
        .await
    }

    pub async fn filter_options(&self) -> Sourced<FilterOptions> {
        self.answer(
            "filter_options",
            |source| source.filter_options(),
            FallbackDataset::filter_options,
        )
        .await
    }

    async fn answer<'a, T, Fut>(
        &'a self,
        operation: &'static str,
        live: impl FnOnce(&'a dyn CaseSource) -> Fut,
        fallback: impl FnOnce(&'a FallbackDataset) -> T,
    ) -> Sourced<T>
    where
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let Some(primary) = self.primary.as_deref() else {
            return Sourced::fallback(fallback(&self.fallback));
        };

        let error = match tokio::time::timeout(self.query_timeout, live(primary)).await {
            Ok(Ok(data)) => return Sourced::live(data),
            Ok(Err(error)) => error,
            Err(_) => SourceError::Timeout {
                after: self.query_timeout,
            },
        };

        tracing::warn!(
            operation,
            source = primary.name(),
            %error,
            "Live source failed, serving fallback dataset"
        );
        Sourced::fallback(fallback(&self.fallback))
    }
}
