//! Response envelope shared by every data endpoint

use casewatch_core::CaseFilter;
use serde::Serialize;

use crate::repository::{DataSource, Sourced};

/// `{ success, source, data, pagination?, filters_applied? }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub source: DataSource,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    /// Echo of the listing filters, omitting unset fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters_applied: Option<CaseFilter>,
}

impl<T> Envelope<T> {
    pub fn new(answer: Sourced<T>) -> Self {
        Self {
            success: true,
            source: answer.source,
            data: answer.data,
            pagination: None,
            filters_applied: None,
        }
    }

    pub fn with_pagination(mut self, pagination: PaginationMeta) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_filters(mut self, filter: CaseFilter) -> Self {
        self.filters_applied = Some(filter);
        self
    }
}

/// Page metadata.
///
/// `total` is the size of the returned page, not of the whole result set, and
/// `has_more` only means the page came back full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, returned: usize) -> Self {
        Self {
            page,
            limit,
            total: returned,
            has_more: returned == limit as usize,
        }
    }
}
