//! Filter facet endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use casewatch_core::FilterOptions;

use crate::http::envelope::Envelope;
use crate::http::server::AppState;

/// GET /filters/options - status and case type values with counts
async fn filter_options(State(state): State<Arc<AppState>>) -> Json<Envelope<FilterOptions>> {
    Json(Envelope::new(state.repository.filter_options().await))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/filters/options", get(filter_options))
}
