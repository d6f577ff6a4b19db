//! Case filter shared by the live and fallback sources.
//!
//! All fields are optional; an empty filter matches every case. Supplied
//! fields combine with AND, and `search` is an OR across the text fields
//! covered by [`Case::matches_term`].

use serde::{Deserialize, Serialize};

use crate::case::{Case, CaseStatus};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl CaseFilter {
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_case_type(mut self, case_type: impl Into<String>) -> Self {
        self.case_type = Some(case_type.into());
        self
    }

    pub fn with_amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Reject bounds no case could satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, bound) in [("min_amount", self.min_amount), ("max_amount", self.max_amount)] {
            if let Some(value) = bound {
                if !value.is_finite() {
                    return Err(ValidationError::OutOfRange {
                        field,
                        reason: "must be a finite number",
                    });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(ValidationError::OutOfRange {
                    field: "min_amount",
                    reason: "must not exceed max_amount",
                });
            }
        }
        Ok(())
    }

    /// Trimmed search term, `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Trimmed case type, `None` when absent or blank.
    pub fn case_type(&self) -> Option<&str> {
        self.case_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.case_type().is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
            && self.search_term().is_none()
    }

    /// In-memory evaluation, mirrored by the SQL in the live source.
    pub fn matches(&self, case: &Case) -> bool {
        if let Some(status) = self.status {
            if case.status != status {
                return false;
            }
        }
        if let Some(case_type) = self.case_type() {
            if case.case_type != case_type {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if case.amount_mad < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if case.amount_mad > max {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => case.matches_term(&term.to_lowercase()),
            None => true,
        }
    }
}
