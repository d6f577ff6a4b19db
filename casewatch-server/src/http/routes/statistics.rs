//! Statistics endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use casewatch_core::{RegionStat, Statistics, TrendPoint};
use serde::Serialize;

use crate::http::envelope::Envelope;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_cases: u64,
    pub confirmed_cases: u64,
    pub total_amount_mad: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub overview: Overview,
    pub by_region: Vec<RegionStat>,
    pub trends: Vec<TrendPoint>,
}

impl From<Statistics> for StatisticsResponse {
    fn from(s: Statistics) -> Self {
        Self {
            overview: Overview {
                total_cases: s.total_cases,
                confirmed_cases: s.confirmed_cases,
                total_amount_mad: s.total_amount_mad,
                detection_rate: s.detection_rate,
                false_positive_rate: s.false_positive_rate(),
            },
            by_region: s.by_region,
            trends: s.trends,
        }
    }
}

/// GET /statistics
async fn statistics(State(state): State<Arc<AppState>>) -> Json<Envelope<StatisticsResponse>> {
    let answer = state.repository.statistics().await;
    Json(Envelope::new(answer.map(StatisticsResponse::from)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/statistics", get(statistics))
}
