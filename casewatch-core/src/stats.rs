//! Aggregate statistics and facet counts

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::case::{Case, CaseStatus};

/// Confirmed share of all cases as a percentage rounded to one decimal.
///
/// Defined as 0 when there are no cases.
pub fn detection_rate(confirmed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(confirmed as f64 / total as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStat {
    pub region: String,
    pub case_count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: NaiveDate,
    pub case_count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_cases: u64,
    pub confirmed_cases: u64,
    pub total_amount_mad: f64,
    pub detection_rate: f64,
    pub by_region: Vec<RegionStat>,
    pub trends: Vec<TrendPoint>,
}

impl Statistics {
    /// Build statistics, deriving the detection rate from the counts.
    pub fn new(
        total_cases: u64,
        confirmed_cases: u64,
        total_amount_mad: f64,
        by_region: Vec<RegionStat>,
        trends: Vec<TrendPoint>,
    ) -> Self {
        Self {
            total_cases,
            confirmed_cases,
            total_amount_mad,
            detection_rate: detection_rate(confirmed_cases, total_cases),
            by_region,
            trends,
        }
    }

    /// Totals over an in-memory case set.
    pub fn from_cases(cases: &[Case], by_region: Vec<RegionStat>, trends: Vec<TrendPoint>) -> Self {
        let confirmed = cases
            .iter()
            .filter(|c| c.status == CaseStatus::Confirmed)
            .count() as u64;
        let amount = cases.iter().map(|c| c.amount_mad).sum();
        Self::new(cases.len() as u64, confirmed, amount, by_region, trends)
    }

    pub fn false_positive_rate(&self) -> f64 {
        round1(100.0 - self.detection_rate)
    }
}

/// One facet value with a display label and the number of cases carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub label: String,
    pub count: u64,
}

impl FacetCount {
    pub fn new(value: impl Into<String>, label: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            count,
        }
    }

    /// Facet whose label is the value itself.
    pub fn plain(value: impl Into<String>, count: u64) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            count,
        }
    }
}

/// Amount bucket offered as a filter, half-open `[lower, upper)` in MAD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    pub value: &'static str,
    pub label: &'static str,
    pub lower: f64,
    pub upper: Option<f64>,
}

impl AmountRange {
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.lower && self.upper.map_or(true, |upper| amount < upper)
    }
}

pub const AMOUNT_RANGES: [AmountRange; 4] = [
    AmountRange {
        value: "0-10000",
        label: "0 - 10K MAD",
        lower: 0.0,
        upper: Some(10_000.0),
    },
    AmountRange {
        value: "10000-100000",
        label: "10K - 100K MAD",
        lower: 10_000.0,
        upper: Some(100_000.0),
    },
    AmountRange {
        value: "100000-1000000",
        label: "100K - 1M MAD",
        lower: 100_000.0,
        upper: Some(1_000_000.0),
    },
    AmountRange {
        value: "1000000+",
        label: "1M+ MAD",
        lower: 1_000_000.0,
        upper: None,
    },
];

/// Values the dashboard can offer in its filter dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub status: Vec<FacetCount>,
    pub case_type: Vec<FacetCount>,
    pub regions: Vec<FacetCount>,
    pub amount_ranges: Vec<FacetCount>,
}

impl FilterOptions {
    /// Facets over an in-memory case set.
    ///
    /// Status and case type are sorted by value, regions keep the order of
    /// `by_region` and amount ranges always list every bucket.
    pub fn from_cases(cases: &[Case], by_region: &[RegionStat]) -> Self {
        let mut status: BTreeMap<CaseStatus, u64> = BTreeMap::new();
        let mut case_type: BTreeMap<&str, u64> = BTreeMap::new();
        let mut amounts = [0u64; AMOUNT_RANGES.len()];
        for case in cases {
            *status.entry(case.status).or_default() += 1;
            *case_type.entry(case.case_type.as_str()).or_default() += 1;
            if let Some(i) = AMOUNT_RANGES.iter().position(|r| r.contains(case.amount_mad)) {
                amounts[i] += 1;
            }
        }

        let mut status: Vec<FacetCount> = status
            .into_iter()
            .map(|(s, count)| FacetCount::new(s.as_str(), s.label(), count))
            .collect();
        status.sort_by(|a, b| a.value.cmp(&b.value));

        Self {
            status,
            case_type: case_type
                .into_iter()
                .map(|(value, count)| FacetCount::plain(value, count))
                .collect(),
            regions: region_facets(by_region),
            amount_ranges: amount_facets(amounts),
        }
    }
}

/// Region facet from the region breakdown table.
pub fn region_facets(by_region: &[RegionStat]) -> Vec<FacetCount> {
    by_region
        .iter()
        .map(|r| FacetCount::plain(r.region.as_str(), r.case_count.max(0) as u64))
        .collect()
}

/// Amount range facet from per-bucket counts in `AMOUNT_RANGES` order.
pub fn amount_facets(counts: [u64; AMOUNT_RANGES.len()]) -> Vec<FacetCount> {
    AMOUNT_RANGES
        .iter()
        .zip(counts)
        .map(|(range, count)| FacetCount::new(range.value, range.label, count))
        .collect()
}
