//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `connected` when the live database answers, `fallback` otherwise
    pub status: &'static str,
    pub version: &'static str,
    pub fallback_cases: usize,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let connected = state.repository.is_available().await;
    Json(HealthResponse {
        status: if connected { "connected" } else { "fallback" },
        version: env!("CARGO_PKG_VERSION"),
        fallback_cases: state.repository.fallback().len(),
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CaseRepository;
    use casewatch_core::FallbackDataset;

    #[tokio::test]
    async fn fallback_only_reports_fallback() {
        let state = AppState {
            repository: CaseRepository::fallback_only(Arc::new(FallbackDataset::demo())),
        };
        let Json(body) = health(State(Arc::new(state))).await;
        assert_eq!(body.status, "fallback");
        assert_eq!(body.fallback_cases, 3);
    }
}
