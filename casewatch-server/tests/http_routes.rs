use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use casewatch_core::{CasewatchConfig, FallbackDataset};
use casewatch_server::http::{build_router, AppState};
use casewatch_server::{build_repository, CaseRepository};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

fn fallback_app() -> Router {
    let repository = CaseRepository::fallback_only(Arc::new(FallbackDataset::demo()));
    build_router(AppState { repository }, false)
}

/// Database configured but nothing listening.
fn unreachable_db_app() -> Router {
    let mut config = CasewatchConfig::default();
    config.database.url = Some("postgres://casewatch@127.0.0.1:1/casewatch".into());
    config.database.acquire_timeout_ms = 100;
    config.database.query_timeout_ms = 500;
    let repository = build_repository(&config).expect("lazy repository");
    build_router(AppState { repository }, false)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn ids(data: &Value) -> Vec<&str> {
    data.as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_fallback_without_database() {
    let (status, body) = get(fallback_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "fallback");
    assert_eq!(body["fallback_cases"], 3);
}

#[tokio::test]
async fn list_defaults_to_first_page() {
    let (status, body) = get(fallback_app(), "/cases").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "fallback");
    assert_eq!(ids(&body["data"]), ["DET_001", "DET_002", "DET_003"]);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 20);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["has_more"], false);
    assert_eq!(body["filters_applied"], json!({}));
}

#[tokio::test]
async fn list_filters_by_status() {
    let (status, body) = get(fallback_app(), "/cases?status=confirmed&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["data"]), ["DET_001", "DET_003"]);
    assert_eq!(body["pagination"]["has_more"], true);
    assert_eq!(body["filters_applied"], json!({ "status": "confirmed" }));
}

#[tokio::test]
async fn list_second_page() {
    let (_, body) = get(fallback_app(), "/cases?page=2&limit=2").await;
    assert_eq!(ids(&body["data"]), ["DET_003"]);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["has_more"], false);
}

#[tokio::test]
async fn list_filters_by_amount() {
    let (_, body) = get(fallback_app(), "/cases?min_amount=1000000").await;
    assert_eq!(ids(&body["data"]), ["DET_002", "DET_003"]);
}

#[tokio::test]
async fn list_rejects_non_numeric_limit() {
    let (status, body) = get(fallback_app(), "/cases?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "limit must be a number, got 'abc'");
}

#[tokio::test]
async fn list_rejects_unknown_status() {
    let (status, body) = get(fallback_app(), "/cases?status=lost").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("status"));
}

#[tokio::test]
async fn list_rejects_inverted_amounts() {
    let (status, _) = get(fallback_app(), "/cases?min_amount=10&max_amount=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_includes_related_records() {
    let (status, body) = get(fallback_app(), "/cases/DET_001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["data"]["case_info"]["id"], "DET_001");
    assert_eq!(body["data"]["prescriptions"][0]["id"], "PRES_001");
    assert!(body.get("pagination").is_none());
}

#[tokio::test]
async fn detail_without_relations_is_bare() {
    let (status, body) = get(fallback_app(), "/cases/DET_002").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["case_info"]["status"], "investigation");
    assert_eq!(body["data"]["prescriptions"], Value::Array(vec![]));
}

#[tokio::test]
async fn unknown_case_is_404() {
    let (status, body) = get(fallback_app(), "/cases/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "case 'NOPE' not found");
}

#[tokio::test]
async fn search_matches_case_insensitively() {
    let (status, body) = get(fallback_app(), "/search?q=idrissi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["query"], "idrissi");
    assert_eq!(body["data"]["results_count"], 1);
    assert_eq!(ids(&body["data"]["results"]), ["DET_002"]);
    assert_eq!(body["data"]["results"][0]["relevance_score"], 100);
}

#[tokio::test]
async fn search_requires_query() {
    let (status, body) = get(fallback_app(), "/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "q cannot be empty");

    let (status, _) = get(fallback_app(), "/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn statistics_overview() {
    let (status, body) = get(fallback_app(), "/statistics").await;
    assert_eq!(status, StatusCode::OK);
    let overview = &body["data"]["overview"];
    assert_eq!(overview["total_cases"], 3);
    assert_eq!(overview["confirmed_cases"], 2);
    assert_eq!(overview["detection_rate"], 66.7);
    assert_eq!(overview["false_positive_rate"], 33.3);
    assert_eq!(body["data"]["by_region"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["trends"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn filter_options_count_cases() {
    let (status, body) = get(fallback_app(), "/filters/options").await;
    assert_eq!(status, StatusCode::OK);
    let statuses = body["data"]["status"].as_array().unwrap();
    let confirmed = statuses.iter().find(|f| f["value"] == "confirmed").unwrap();
    assert_eq!(confirmed["count"], 2);
    assert_eq!(confirmed["label"], "Confirmé");
}

#[tokio::test]
async fn filter_options_include_regions_and_amount_ranges() {
    let (_, body) = get(fallback_app(), "/filters/options").await;
    let data = &body["data"];

    let regions = data["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 3);
    assert_eq!(regions[0]["value"], "Casablanca-Settat");
    assert_eq!(regions[0]["label"], "Casablanca-Settat");
    assert_eq!(regions[0]["count"], 45);

    let ranges = data["amount_ranges"].as_array().unwrap();
    let values: Vec<_> = ranges.iter().map(|r| r["value"].as_str().unwrap()).collect();
    assert_eq!(values, ["0-10000", "10000-100000", "100000-1000000", "1000000+"]);
    assert_eq!(ranges[1]["count"], 1);
    assert_eq!(ranges[3]["count"], 2);
    assert_eq!(ranges[3]["label"], "1M+ MAD");
}

#[tokio::test]
async fn unreachable_database_degrades_to_fallback() {
    let (status, body) = get(unreachable_db_app(), "/cases?status=confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(ids(&body["data"]), ["DET_001", "DET_003"]);

    let (_, body) = get(unreachable_db_app(), "/health").await;
    assert_eq!(body["status"], "fallback");
}

#[test]
fn zero_query_timeout_is_rejected_with_database() {
    let mut config = CasewatchConfig::default();
    config.database.url = Some("postgres://casewatch@127.0.0.1:1/casewatch".into());
    config.database.query_timeout_ms = 0;
    match build_repository(&config) {
        Ok(_) => panic!("zero query timeout accepted"),
        Err(err) => assert!(err.to_string().contains("query_timeout_ms must be > 0")),
    }
}
