//! Free-text search endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use casewatch_core::{Case, CaseStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::envelope::Envelope;
use crate::http::extractors::SearchQuery;
use crate::http::server::AppState;

/// Hits are unranked, so every match carries the same score.
const RELEVANCE_SCORE: u8 = 100;

/// One search hit
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub status: CaseStatus,
    pub amount_mad: f64,
    pub detection_date: DateTime<Utc>,
    pub patient_name: String,
    pub doctor_name: String,
    pub pharmacy_name: String,
    pub relevance_score: u8,
}

impl From<Case> for SearchHit {
    fn from(c: Case) -> Self {
        Self {
            id: c.id,
            case_type: c.case_type,
            status: c.status,
            amount_mad: c.amount_mad,
            detection_date: c.detection_date,
            patient_name: c.patient_name,
            doctor_name: c.doctor_name,
            pharmacy_name: c.pharmacy_name,
            relevance_score: RELEVANCE_SCORE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results_count: usize,
    pub results: Vec<SearchHit>,
}

/// GET /search?q=&limit=
async fn search(
    State(state): State<Arc<AppState>>,
    query: SearchQuery,
) -> Json<Envelope<SearchResults>> {
    let answer = state.repository.search_cases(&query.term, query.limit).await;
    tracing::debug!(term = %query.term, hits = answer.data.len(), source = %answer.source, "Search");

    Json(Envelope::new(answer.map(|cases| SearchResults {
        results_count: cases.len(),
        results: cases.into_iter().map(SearchHit::from).collect(),
        query: query.term,
    })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search))
}
