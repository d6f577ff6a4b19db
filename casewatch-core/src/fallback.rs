//! Immutable in-memory case set served when the live datastore is unreachable.
//!
//! The dataset is built once (from the embedded demo fixture or a JSON file)
//! and handed to whoever needs it; nothing mutates it afterwards.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::case::{Case, CaseDetail, CaseRelations};
use crate::error::{CoreError, Result};
use crate::filter::CaseFilter;
use crate::page::PageRequest;
use crate::stats::{FilterOptions, RegionStat, Statistics, TrendPoint};

const DEMO_FIXTURE: &str = include_str!("../fixtures/demo.json");

/// On-disk fixture layout
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Fixture {
    cases: Vec<Case>,
    relations: BTreeMap<String, CaseRelations>,
    by_region: Vec<RegionStat>,
    trends: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default)]
pub struct FallbackDataset {
    /// Kept in listing order
    cases: Vec<Case>,
    relations: BTreeMap<String, CaseRelations>,
    by_region: Vec<RegionStat>,
    trends: Vec<TrendPoint>,
}

impl FallbackDataset {
    /// Build a dataset, checking ids are unique and relations point at known cases.
    pub fn new(
        mut cases: Vec<Case>,
        relations: BTreeMap<String, CaseRelations>,
        by_region: Vec<RegionStat>,
        trends: Vec<TrendPoint>,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(cases.len());
        for case in &cases {
            if !seen.insert(case.id.as_str()) {
                return Err(CoreError::fixture(format!("duplicate case id '{}'", case.id)));
            }
        }
        if let Some(orphan) = relations.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(CoreError::fixture(format!(
                "relations reference unknown case '{}'",
                orphan
            )));
        }

        cases.sort_by(Case::newest_first);
        Ok(Self {
            cases,
            relations,
            by_region,
            trends,
        })
    }

    /// Dataset with no cases at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in demo cases.
    pub fn demo() -> Self {
        Self::from_json_str(DEMO_FIXTURE, "embedded demo fixture")
            .expect("embedded demo fixture is valid")
    }

    pub fn from_json_str(json: &str, context: &str) -> Result<Self> {
        let fixture: Fixture =
            serde_json::from_str(json).map_err(|e| CoreError::json(context, e))?;
        Self::new(
            fixture.cases,
            fixture.relations,
            fixture.by_region,
            fixture.trends,
        )
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let dataset = Self::from_json_str(&json, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            cases = dataset.len(),
            "Loaded fallback fixture"
        );
        Ok(dataset)
    }

    /// Serialize back into the fixture layout `from_json_str` reads.
    pub fn to_json_pretty(&self) -> Result<String> {
        let fixture = Fixture {
            cases: self.cases.clone(),
            relations: self.relations.clone(),
            by_region: self.by_region.clone(),
            trends: self.trends.clone(),
        };
        serde_json::to_string_pretty(&fixture).map_err(|e| CoreError::json("fallback fixture", e))
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// All cases, newest first.
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn relations(&self, case_id: &str) -> Option<&CaseRelations> {
        self.relations.get(case_id)
    }

    /// Filtered, ordered, windowed listing.
    pub fn list(&self, page: PageRequest, filter: &CaseFilter) -> Vec<Case> {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        self.cases
            .iter()
            .filter(|case| filter.matches(case))
            .skip(offset)
            .take(page.limit() as usize)
            .cloned()
            .collect()
    }

    /// Case plus whatever related records the fixture carries for it.
    pub fn get(&self, case_id: &str) -> Option<CaseDetail> {
        let case = self.cases.iter().find(|c| c.id == case_id)?.clone();
        let related = self.relations.get(case_id).cloned().unwrap_or_default();
        Some(CaseDetail::new(case, related))
    }

    pub fn search(&self, term: &str, limit: u32) -> Vec<Case> {
        self.list(
            PageRequest::new(limit, 0),
            &CaseFilter::default().with_search(term),
        )
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_cases(&self.cases, self.by_region.clone(), self.trends.clone())
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_cases(&self.cases, &self.by_region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseStatus;

    fn ids(cases: &[Case]) -> Vec<&str> {
        cases.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn demo_is_sorted_newest_first() {
        let demo = FallbackDataset::demo();
        assert_eq!(ids(demo.cases()), ["DET_001", "DET_002", "DET_003"]);
    }

    #[test]
    fn confirmed_cases_newest_first() {
        let demo = FallbackDataset::demo();
        let filter = CaseFilter::default().with_status(CaseStatus::Confirmed);
        let cases = demo.list(PageRequest::new(2, 0), &filter);
        assert_eq!(ids(&cases), ["DET_001", "DET_003"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let demo = FallbackDataset::demo();
        assert_eq!(ids(&demo.search("IDRISSI", 10)), ["DET_002"]);
        assert_eq!(ids(&demo.search("idrissi", 10)), ["DET_002"]);
        assert_eq!(ids(&demo.search("pharmacie", 2)), ["DET_001", "DET_002"]);
        assert!(demo.search("nobody", 10).is_empty());
    }

    #[test]
    fn detail_lookup() {
        let demo = FallbackDataset::demo();

        let detail = demo.get("DET_001").unwrap();
        assert_eq!(detail.related.prescriptions.len(), 1);
        assert_eq!(detail.related.prescriptions[0].medications[0].name, "Humira");
        assert_eq!(detail.related.ai_detections[0].confidence_score, 95.5);

        let bare = demo.get("DET_002").unwrap();
        assert!(bare.related.prescriptions.is_empty());

        assert!(demo.get("NOPE").is_none());
    }

    #[test]
    fn statistics_derive_from_cases() {
        let stats = FallbackDataset::demo().statistics();
        assert_eq!(stats.total_cases, 3);
        assert_eq!(stats.confirmed_cases, 2);
        assert_eq!(stats.total_amount_mad, 3_518_000.0);
        assert_eq!(stats.detection_rate, 66.7);
        assert_eq!(stats.by_region.len(), 3);
        assert_eq!(stats.trends.len(), 2);
    }

    #[test]
    fn empty_dataset_statistics() {
        let stats = FallbackDataset::empty().statistics();
        assert_eq!(stats.total_cases, 0);
        assert_eq!(stats.detection_rate, 0.0);
    }

    #[test]
    fn filter_options_count_values() {
        let options = FallbackDataset::demo().filter_options();
        let confirmed = options.status.iter().find(|f| f.value == "confirmed").unwrap();
        assert_eq!(confirmed.count, 2);
        assert_eq!(confirmed.label, "Confirmé");
        assert_eq!(options.case_type.len(), 3);
        assert_eq!(options.case_type[0].label, options.case_type[0].value);
    }

    #[test]
    fn filter_options_include_regions_and_amount_ranges() {
        let options = FallbackDataset::demo().filter_options();

        let regions: Vec<_> = options.regions.iter().map(|f| (f.value.as_str(), f.count)).collect();
        assert_eq!(
            regions,
            [("Casablanca-Settat", 45), ("Rabat-Salé-Kénitra", 32), ("Marrakech-Safi", 28)]
        );

        let ranges: Vec<_> = options
            .amount_ranges
            .iter()
            .map(|f| (f.value.as_str(), f.count))
            .collect();
        assert_eq!(
            ranges,
            [("0-10000", 0), ("10000-100000", 1), ("100000-1000000", 0), ("1000000+", 2)]
        );
        assert_eq!(options.amount_ranges[3].label, "1M+ MAD");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let demo = FallbackDataset::demo();
        let mut cases = demo.cases().to_vec();
        cases.push(cases[0].clone());
        let err = FallbackDataset::new(cases, BTreeMap::new(), vec![], vec![]).unwrap_err();
        assert!(err.to_string().contains("duplicate case id"));
    }

    #[test]
    fn rejects_orphan_relations() {
        let json = r#"{ "cases": [], "relations": { "DET_404": {} } }"#;
        let err = FallbackDataset::from_json_str(json, "test").unwrap_err();
        assert!(err.to_string().contains("DET_404"));
    }

    #[test]
    fn json_roundtrip_preserves_lookups() {
        let demo = FallbackDataset::demo();
        let json = demo.to_json_pretty().unwrap();
        let reloaded = FallbackDataset::from_json_str(&json, "roundtrip").unwrap();
        assert_eq!(reloaded.cases(), demo.cases());
        assert_eq!(reloaded.get("DET_001"), demo.get("DET_001"));
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FallbackDataset::demo().to_json_pretty().unwrap()).unwrap();
        let dataset = FallbackDataset::from_json_path(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);

        let missing = FallbackDataset::from_json_path(Path::new("/nonexistent/fixture.json"));
        assert!(matches!(missing, Err(CoreError::Io { .. })));
    }
}
