//! Query-string extractors that validate before a handler runs
//!
//! Every parameter arrives as an optional string so malformed numbers are
//! reported as `{ "error": ... }` 400s instead of axum's plain-text rejection.

use std::str::FromStr;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use casewatch_core::page::DEFAULT_LIMIT;
use casewatch_core::{CaseFilter, CaseStatus, PageRequest, ValidationError};
use serde::Deserialize;

use super::error::ApiError;

/// Raw `/cases` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct CaseListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub case_type: Option<String>,
    pub search: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
}

/// Raw `/search` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Treat absent and blank parameters alike.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number<T: FromStr>(field: &'static str, value: &Option<String>) -> Result<Option<T>, ValidationError> {
    present(value)
        .map(|raw| {
            raw.parse().map_err(|_| ValidationError::NotNumeric {
                field,
                value: raw.to_owned(),
            })
        })
        .transpose()
}

fn positive(field: &'static str, value: Option<u32>, default: u32) -> Result<u32, ValidationError> {
    match value {
        Some(0) => Err(ValidationError::OutOfRange {
            field,
            reason: "must be at least 1",
        }),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

/// Validated listing request
#[derive(Debug, Clone, PartialEq)]
pub struct CaseListQuery {
    /// 1-indexed page number as requested
    pub page: u32,
    pub window: PageRequest,
    pub filter: CaseFilter,
}

impl TryFrom<CaseListParams> for CaseListQuery {
    type Error = ValidationError;

    fn try_from(params: CaseListParams) -> Result<Self, Self::Error> {
        let page = positive("page", parse_number("page", &params.page)?, 1)?;
        let limit = positive("limit", parse_number("limit", &params.limit)?, DEFAULT_LIMIT)?;

        let mut filter = CaseFilter::default().with_amount_range(
            parse_number("min_amount", &params.min_amount)?,
            parse_number("max_amount", &params.max_amount)?,
        );
        if let Some(status) = present(&params.status) {
            filter = filter.with_status(CaseStatus::from_str(status)?);
        }
        if let Some(case_type) = present(&params.case_type) {
            filter = filter.with_case_type(case_type);
        }
        if let Some(search) = present(&params.search) {
            filter = filter.with_search(search);
        }
        filter.validate()?;

        Ok(Self {
            page,
            window: PageRequest::from_page(page, limit),
            filter,
        })
    }
}

/// Validated search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub term: String,
    pub limit: u32,
}

impl TryFrom<SearchParams> for SearchQuery {
    type Error = ValidationError;

    fn try_from(params: SearchParams) -> Result<Self, Self::Error> {
        let term = present(&params.q).ok_or(ValidationError::Empty { field: "q" })?;
        let limit = positive("limit", parse_number("limit", &params.limit)?, DEFAULT_LIMIT)?;
        Ok(Self {
            term: term.to_owned(),
            limit: PageRequest::new(limit, 0).limit(),
        })
    }
}

async fn validated<P, Q, S>(parts: &mut Parts, state: &S) -> Result<Q, ApiError>
where
    P: serde::de::DeserializeOwned + Send,
    Q: TryFrom<P, Error = ValidationError>,
    S: Send + Sync,
{
    let Query(params): Query<P> = Query::from_request_parts(parts, state).await.map_err(|_| {
        ApiError::Validation(ValidationError::OutOfRange {
            field: "query",
            reason: "malformed query string",
        })
    })?;
    Ok(Q::try_from(params)?)
}

impl<S> FromRequestParts<S> for CaseListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        validated::<CaseListParams, _, _>(parts, state).await
    }
}

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        validated::<SearchParams, _, _>(parts, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> CaseListParams {
        let mut p = CaseListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => p.page = value,
                "limit" => p.limit = value,
                "status" => p.status = value,
                "case_type" => p.case_type = value,
                "search" => p.search = value,
                "min_amount" => p.min_amount = value,
                "max_amount" => p.max_amount = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let q = CaseListQuery::try_from(CaseListParams::default()).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.window, PageRequest::new(20, 0));
        assert!(q.filter.is_empty());
    }

    #[test]
    fn page_becomes_offset() {
        let q = CaseListQuery::try_from(params(&[("page", "3"), ("limit", "10")])).unwrap();
        assert_eq!(q.window.offset(), 20);
        assert_eq!(q.window.limit(), 10);
    }

    #[test]
    fn blank_values_are_ignored() {
        let q = CaseListQuery::try_from(params(&[("status", " "), ("min_amount", "")])).unwrap();
        assert!(q.filter.is_empty());
    }

    #[test]
    fn rejects_non_numeric_limit() {
        let err = CaseListQuery::try_from(params(&[("limit", "abc")])).unwrap_err();
        assert_eq!(err.to_string(), "limit must be a number, got 'abc'");
    }

    #[test]
    fn rejects_zero_page() {
        let err = CaseListQuery::try_from(params(&[("page", "0")])).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "page", .. }));
    }

    #[test]
    fn rejects_unknown_status() {
        let err = CaseListQuery::try_from(params(&[("status", "lost")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { .. }));
    }

    #[test]
    fn rejects_inverted_amount_range() {
        let err =
            CaseListQuery::try_from(params(&[("min_amount", "500"), ("max_amount", "10")])).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "min_amount", .. }));
    }

    #[test]
    fn search_requires_term() {
        let err = SearchQuery::try_from(SearchParams {
            q: Some("   ".into()),
            limit: None,
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "q" });
    }

    #[test]
    fn search_limit_is_clamped() {
        let q = SearchQuery::try_from(SearchParams {
            q: Some(" idrissi ".into()),
            limit: Some("5000".into()),
        })
        .unwrap();
        assert_eq!(q.term, "idrissi");
        assert_eq!(q.limit, 1000);
    }
}
